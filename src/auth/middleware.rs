//! Authentication Middleware
//!
//! Axum adapter that runs a [`RequestGate`] in front of protected routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::auth::gate::RequestGate;

/// Authentication middleware that validates JWT tokens and injects the identity
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Reject the request, or attach its `AuthContext` and run the next
    /// stage exactly once.
    pub async fn require_auth(
        State(gate): State<Arc<dyn RequestGate>>,
        mut req: Request,
        next: Next,
    ) -> Response {
        match gate.admit(req.headers()) {
            Ok(ctx) => {
                req.extensions_mut().insert(ctx);
                next.run(req).await
            }
            Err(err) => {
                tracing::warn!(
                    "[AuthMiddleware] Rejected {} {}: {}",
                    req.method(),
                    req.uri().path(),
                    err
                );
                err.into_response()
            }
        }
    }
}
