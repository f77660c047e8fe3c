use axum::{Extension, Json};

use crate::auth::models::{AuthContext, PrivateResponse};

/// Protected resource: echoes the caller's identity back.
///
/// Mounted behind the auth gate, which guarantees the [`AuthContext`] is there.
pub async fn private(Extension(ctx): Extension<AuthContext>) -> Json<PrivateResponse> {
    tracing::debug!("Serving private resource to sub={}", ctx.subject());
    Json(PrivateResponse { ok: true, user: ctx })
}
