//! Authentication Models
//!
//! Data structures for authentication requests, responses, and user information.

use serde::{Deserialize, Serialize};

use crate::auth::jwt::Claims;

/// Authenticated identity extracted from a verified JWT.
///
/// The gate inserts one into the request extensions; it lives as long as the
/// request does.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AuthContext {
    pub claims: Claims,
}

impl AuthContext {
    pub fn subject(&self) -> &str {
        &self.claims.sub
    }
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self { claims }
    }
}

/// Login request payload. Both fields are optional on the wire so that a
/// missing one is reported as a validation error, not a parse failure.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub pass: Option<String>,
}

impl LoginRequest {
    /// Both fields, if both are present and non-empty
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.user.as_deref(), self.pass.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

/// Token response after successful authentication
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Body returned by the protected resource
#[derive(Debug, Serialize)]
pub struct PrivateResponse {
    pub ok: bool,
    pub user: AuthContext,
}
