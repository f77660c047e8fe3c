//! Request Gate
//!
//! Decides, from the request headers alone, whether a request may reach a
//! protected handler. The answer is either an [`AuthContext`] or a reason
//! for rejection; there is no third outcome.

use axum::http::{header, HeaderMap};

use crate::auth::{error::AuthError, jwt::JwtService, models::AuthContext};

const BEARER_PREFIX: &str = "Bearer ";

pub trait RequestGate: Send + Sync {
    fn admit(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError>;
}

/// Token text of an `Authorization: Bearer <token>` header, if there is one.
/// Other schemes, non-ASCII values and an empty token all count as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.is_empty())
}

/// Gate that admits requests carrying a bearer JWT signed by this service.
#[derive(Clone)]
pub struct BearerGate {
    jwt_service: JwtService,
}

impl BearerGate {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl RequestGate for BearerGate {
    fn admit(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::MissingCredentials)?;

        let claims = self.jwt_service.decode_claims(token).map_err(|e| {
            tracing::warn!("[BearerGate] JWT validation failed: {:#}", e);
            AuthError::InvalidToken
        })?;

        tracing::debug!("[BearerGate] JWT validated for sub={}", claims.sub);
        Ok(AuthContext::from(claims))
    }
}
