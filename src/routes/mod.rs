// # Routes Module
//
// - HTTP route handlers, one submodule per area.
// - Routes are registered in `server.rs`.

/// Health check endpoint
pub mod health;

/// Token issuance
pub mod auth;

/// Resources behind the auth gate
pub mod private;
