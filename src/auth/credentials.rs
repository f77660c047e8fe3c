//! Credential Verification
//!
//! The issuer never decides on its own whether a user/password pair is good.
//! It asks a [`CredentialVerifier`], chosen at startup.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Whether `pass` is the right secret for `user`. Callers have already
    /// rejected empty values.
    async fn verify(&self, user: &str, pass: &str) -> Result<bool>;

    /// Short name for startup logs
    fn name(&self) -> &'static str;
}

/// Accepts every non-empty pair. Only suitable for demos.
#[derive(Debug, Default, Clone)]
pub struct AcceptAnyCredentials;

#[async_trait]
impl CredentialVerifier for AcceptAnyCredentials {
    async fn verify(&self, user: &str, pass: &str) -> Result<bool> {
        Ok(!user.is_empty() && !pass.is_empty())
    }

    fn name(&self) -> &'static str {
        "accept-any"
    }
}

/// Fixed in-memory user table holding Argon2 hashes.
#[derive(Debug)]
pub struct StaticCredentials {
    users: HashMap<String, String>,
    /// Checked against for unknown users so that every lookup pays one
    /// Argon2 verification.
    dummy_hash: String,
}

fn hash_password(argon2: &Argon2<'_>, pass: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(argon2
        .hash_password(pass.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?
        .to_string())
}

impl StaticCredentials {
    /// Hash each `(user, pass)` pair into the table.
    pub fn new<I, U, P>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: AsRef<str>,
    {
        let argon2 = Argon2::default();
        let mut users = HashMap::new();

        for (user, pass) in entries {
            let user = user.into();
            let pass = pass.as_ref();
            if user.is_empty() || pass.is_empty() {
                return Err(anyhow!("credential entries need a non-empty user and password"));
            }

            if users.contains_key(&user) {
                return Err(anyhow!("duplicate credential entry for user {:?}", user));
            }

            let password_hash = hash_password(&argon2, pass)
                .map_err(|e| e.context(format!("Failed to hash password for {}", user)))?;
            users.insert(user, password_hash);
        }

        let dummy_hash = hash_password(&argon2, "unknown-user-placeholder")?;
        Ok(Self { users, dummy_hash })
    }

    /// Parse `alice:secret,bob:hunter2`. Passwords may contain `:`; the user
    /// name ends at the first one.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (user, pass) = entry
                .split_once(':')
                .ok_or_else(|| anyhow!("AUTH_USERS entry {:?} is not in user:pass form", entry))?;
            entries.push((user.trim().to_string(), pass.to_string()));
        }
        if entries.is_empty() {
            return Err(anyhow!("AUTH_USERS contains no entries"));
        }
        Self::new(entries)
    }
}

#[async_trait]
impl CredentialVerifier for StaticCredentials {
    async fn verify(&self, user: &str, pass: &str) -> Result<bool> {
        let (stored, known) = match self.users.get(user) {
            Some(stored) => (stored, true),
            None => (&self.dummy_hash, false),
        };
        let parsed_hash = PasswordHash::new(stored)
            .map_err(|e| anyhow!("Stored hash for {} is unreadable: {}", user, e))?;
        let matches = Argon2::default()
            .verify_password(pass.as_bytes(), &parsed_hash)
            .is_ok();
        Ok(known && matches)
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
