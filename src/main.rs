//! # JWT Gate
//!
//! A small HTTP API that issues signed, time-limited bearer tokens and keeps a
//! protected resource behind a token-verifying gate. Built with Axum, Tokio and
//! `jsonwebtoken`.
//!
//! ## Architecture
//! - `server`: router assembly, shared state, startup and shutdown
//! - `config`: environment variable configuration
//! - `auth`: token service, credential verifiers, the request gate and its
//!   middleware adapter
//! - `routes`: HTTP handlers
//!   - `health`: `GET /ping`
//!   - `auth`: `POST /auth/login`
//!   - `private`: `GET /api/private` (gated)
//!
//! ## Running the Server
//! ```bash
//! JWT_SECRET=change-me cargo run
//! ```
//!
//! The server listens on `http://0.0.0.0:4001` by default.
//!
//! ```bash
//! TOKEN=$(curl -s -XPOST localhost:4001/auth/login \
//!   -H 'content-type: application/json' \
//!   -d '{"user":"alice","pass":"secret"}' | jq -r .token)
//! curl -H "Authorization: Bearer $TOKEN" localhost:4001/api/private
//! ```

mod auth;
mod config;
mod routes;
mod server;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already be set.
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();

    tracing::info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    tracing::info!("Build profile: {}", if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    });

    let config = Config::from_env()?;
    tracing::debug!("Loaded configuration: {:?}", config);

    server::start(config).await
}
