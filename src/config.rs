//! Configuration module for environment variables and application settings

use std::env;
use std::str::FromStr;
use anyhow::{Context, Result, anyhow};

/// Used when `JWT_SECRET` is unset or empty. Tokens signed with it do not survive a
/// change of deployment, and anyone who reads this file can forge them.
pub const DEFAULT_JWT_SECRET: &str = "dev-secret-change-me";

/// Upper bound for `TOKEN_TTL_SECS`: one year.
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Token signing configuration
    pub jwt: JwtConfig,

    /// `user:pass` pairs for the static credential table, if configured
    pub auth_users: Option<String>,

    /// Allowed CORS origins; `None` means any origin
    pub cors_allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_secs: i64,
    /// Whether `secret` came from the fallback default
    pub using_default_secret: bool,
}

// Keeps the secret out of `{:?}` output.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("ttl_secs", &self.ttl_secs)
            .field("using_default_secret", &self.using_default_secret)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET").filter(|s| !s.is_empty());
        let using_default_secret = secret.is_none();

        let ttl_secs: i64 = parse_or(&lookup, "TOKEN_TTL_SECS", 3600)?;
        if ttl_secs <= 0 || ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(anyhow!(
                "TOKEN_TTL_SECS must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_SECS,
                ttl_secs
            ));
        }

        let issuer = lookup("JWT_ISSUER").unwrap_or_else(|| "jwt-gate".to_string());
        if issuer.trim().is_empty() {
            return Err(anyhow!("JWT_ISSUER must not be empty"));
        }

        Ok(Self {
            server: ServerConfig {
                host: lookup("SERVER_HOST")
                    .unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "PORT", 4001)?,
            },

            jwt: JwtConfig {
                secret: secret.unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
                issuer,
                ttl_secs,
                using_default_secret,
            },

            auth_users: lookup("AUTH_USERS").filter(|s| !s.trim().is_empty()),

            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS").map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            }),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}
