//! # Server Module
//!
//! HTTP server setup and route configuration.

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{
    credentials::{AcceptAnyCredentials, CredentialVerifier, StaticCredentials},
    gate::{BearerGate, RequestGate},
    jwt::JwtService,
    middleware::AuthMiddleware,
};
use crate::config::Config;
use crate::routes::{auth, health::ping, private::private};

/// Application state shared across all route handlers.
///
/// Everything in here is read-only once the server is running.
#[derive(Clone)]
pub struct AppState {
    pub jwt_service: Arc<JwtService>,
    pub credentials: Arc<dyn CredentialVerifier>,
    pub gate: Arc<dyn RequestGate>,
}

impl AppState {
    pub fn new(jwt_service: JwtService, credentials: Arc<dyn CredentialVerifier>) -> Self {
        let gate: Arc<dyn RequestGate> = Arc::new(BearerGate::new(jwt_service.clone()));
        Self {
            jwt_service: Arc::new(jwt_service),
            credentials,
            gate,
        }
    }

    /// Build state from configuration: signing keys from the JWT section,
    /// a static user table when `AUTH_USERS` is set, otherwise accept-any.
    pub fn from_config(config: &Config) -> Result<Self> {
        let credentials: Arc<dyn CredentialVerifier> = match &config.auth_users {
            Some(users) => Arc::new(
                StaticCredentials::parse(users).context("Failed to load AUTH_USERS")?,
            ),
            None => Arc::new(AcceptAnyCredentials),
        };
        Ok(Self::new(JwtService::from_config(&config.jwt), credentials))
    }
}

/// Assemble the router: public routes, then protected routes behind the gate.
pub fn build_router(app_state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/private", get(private))
        .layer(middleware::from_fn_with_state(
            app_state.gate.clone(),
            AuthMiddleware::require_auth,
        ));

    Router::new()
        .route("/ping", get(ping))
        .merge(auth::create_auth_routes())
        .merge(protected_routes)
        .with_state(app_state)
}

fn cors_layer(allowed_origins: Option<&[String]>) -> Result<CorsLayer> {
    let origin = match allowed_origins {
        Some(origins) => {
            let origins = origins
                .iter()
                .map(|o| {
                    o.parse::<HeaderValue>()
                        .with_context(|| format!("Invalid CORS origin: {}", o))
                })
                .collect::<Result<Vec<_>>>()?;
            AllowOrigin::list(origins)
        }
        None => AllowOrigin::from(Any),
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ]))
}

/// Starts the HTTP server and runs until Ctrl+C or SIGTERM.
pub async fn start(config: Config) -> Result<()> {
    if config.jwt.using_default_secret {
        tracing::warn!("JWT_SECRET is unset or empty, signing with the built-in development secret");
    }

    let app_state = AppState::from_config(&config)?;
    tracing::info!("Credential verifier: {}", app_state.credentials.name());

    let app = build_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(config.cors_allowed_origins.as_deref())?),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} - port may already be in use", addr))?;

    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Login at POST http://{}/auth/login", addr);
    tracing::info!("Health check available at http://{}/ping", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::Claims;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const SECRET: &str = "server_test_secret";

    fn jwt() -> JwtService {
        JwtService::new(SECRET, "jwt-gate", 3600)
    }

    fn app() -> Router {
        build_router(AppState::new(jwt(), Arc::new(AcceptAnyCredentials)))
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn login_request(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn private_request(auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/api/private");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn login(app: Router, user: &str, pass: &str) -> String {
        let body = json!({ "user": user, "pass": pass }).to_string();
        let (status, body) = send(app, login_request(&body)).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_login_then_access_private() {
        let token = login(app(), "alice", "secret").await;

        let (status, body) =
            send(app(), private_request(Some(&format!("Bearer {}", token)))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["user"]["sub"], "alice");
        assert_eq!(body["user"]["iss"], "jwt-gate");
    }

    #[tokio::test]
    async fn test_issued_token_decodes_to_subject() {
        for user in ["alice", "bob", "user with spaces", "ünïcode"] {
            let token = login(app(), user, "pw").await;
            assert_eq!(jwt().decode_claims(&token).unwrap().sub, user);
        }
    }

    #[tokio::test]
    async fn test_login_missing_creds() {
        for body in [
            r#"{"user":"alice"}"#,
            r#"{"pass":"secret"}"#,
            r#"{"user":"","pass":"secret"}"#,
            r#"{"user":"alice","pass":""}"#,
            r#"{}"#,
            "not json",
            "",
        ] {
            let (status, body) = send(app(), login_request(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "error": "missing creds" }));
        }
    }

    #[tokio::test]
    async fn test_login_with_static_credentials() {
        let verifier = StaticCredentials::parse("alice:secret").unwrap();
        let app = build_router(AppState::new(jwt(), Arc::new(verifier)));

        let ok = json!({ "user": "alice", "pass": "secret" }).to_string();
        let (status, _) = send(app.clone(), login_request(&ok)).await;
        assert_eq!(status, StatusCode::OK);

        for (user, pass) in [("alice", "wrong"), ("carol", "secret")] {
            let body = json!({ "user": user, "pass": pass }).to_string();
            let (status, body) = send(app.clone(), login_request(&body)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, json!({ "error": "invalid creds" }));
        }
    }

    #[tokio::test]
    async fn test_private_without_token() {
        let (status, body) = send(app(), private_request(None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "no token" }));
    }

    #[tokio::test]
    async fn test_private_with_empty_or_foreign_scheme() {
        for auth in ["Bearer ", "Basic YWxpY2U6c2VjcmV0", "bearer abc", "Token abc"] {
            let (status, body) = send(app(), private_request(Some(auth))).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "header {:?}", auth);
            assert_eq!(body, json!({ "error": "no token" }), "header {:?}", auth);
        }
    }

    #[tokio::test]
    async fn test_login_with_overflowing_ttl_is_internal_error() {
        let jwt = JwtService::new(SECRET, "jwt-gate", i64::MAX);
        let app = build_router(AppState::new(jwt, Arc::new(AcceptAnyCredentials)));

        let body = json!({ "user": "alice", "pass": "secret" }).to_string();
        let (status, body) = send(app, login_request(&body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "internal error" }));
    }

    #[tokio::test]
    async fn test_private_with_garbage_token() {
        let (status, body) = send(app(), private_request(Some("Bearer garbage"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "bad token" }));
    }

    #[tokio::test]
    async fn test_private_with_foreign_token() {
        let foreign = JwtService::new("other_secret", "jwt-gate", 3600)
            .create_token("alice")
            .unwrap();
        let (status, body) =
            send(app(), private_request(Some(&format!("Bearer {}", foreign)))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "bad token" }));
    }

    #[tokio::test]
    async fn test_private_with_expired_token() {
        let now = chrono::Utc::now().timestamp();
        let expired = jwt()
            .sign(&Claims {
                sub: "alice".to_string(),
                iat: now - 3700,
                exp: now - 100,
                iss: "jwt-gate".to_string(),
            })
            .unwrap();
        let (status, body) =
            send(app(), private_request(Some(&format!("Bearer {}", expired)))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "bad token" }));
    }

    #[tokio::test]
    async fn test_ping_is_public() {
        let req = Request::builder().uri("/ping").body(Body::empty()).unwrap();
        let (status, body) = send(app(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "pong" }));
    }

    #[test]
    fn test_cors_layer_rejects_bad_origin() {
        assert!(cors_layer(None).is_ok());
        assert!(cors_layer(Some(["http://localhost:3000".to_string()].as_slice())).is_ok());
        assert!(cors_layer(Some(["bad\norigin".to_string()].as_slice())).is_err());
    }
}
