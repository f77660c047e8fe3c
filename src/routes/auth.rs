//! Auth routes: token issuance

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::auth::{
    error::AuthError,
    models::{LoginRequest, TokenResponse},
};
use crate::server::AppState;

/// Issue a token for a user/password pair.
///
/// # Route
/// - **Method**: POST
/// - **Path**: `/auth/login`
/// - **Body**: `{ "user": "...", "pass": "..." }`
///
/// # HTTP Status Codes
/// - **200 OK**: `{ "token": "<jwt>" }`
/// - **400 Bad Request**: `{ "error": "missing creds" }` when a field is
///   missing, empty, or the body is not JSON
/// - **401 Unauthorized**: `{ "error": "invalid creds" }` when the credential
///   verifier rejects the pair
pub async fn login(
    State(app_state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AuthError> {
    // An unreadable body is treated like an empty one.
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            tracing::debug!("Login body rejected: {}", rejection);
            LoginRequest::default()
        }
    };

    let (user, pass) = payload.credentials().ok_or_else(|| {
        tracing::warn!("Login attempt with missing credentials");
        AuthError::Validation
    })?;

    if !app_state.credentials.verify(user, pass).await? {
        tracing::warn!("Login rejected for user={}", user);
        return Err(AuthError::InvalidCredentials);
    }

    let token = app_state.jwt_service.create_token(user)?;
    tracing::info!("Issued token for user={}", user);

    Ok(Json(TokenResponse { token }))
}

pub fn create_auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}
