//! Authentication Errors
//!
//! Every failure on the login and gate paths ends up here, and each variant
//! maps to one HTTP status and a `{ "error": ... }` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Login body missing `user` or `pass`, or either is empty
    #[error("missing creds")]
    Validation,

    /// Credential verifier rejected the pair
    #[error("invalid creds")]
    InvalidCredentials,

    /// No bearer token on a protected request
    #[error("no token")]
    MissingCredentials,

    /// Token present but unverifiable or expired
    #[error("bad token")]
    InvalidToken,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::MissingCredentials
            | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(ref e) = self {
            tracing::error!("Internal error while handling auth request: {:#}", e);
        }
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
