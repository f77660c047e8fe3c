//! # Authentication Module
//!
//! Handles JWT token issuance, validation, and the request gate that secures
//! API endpoints.

pub mod credentials;
pub mod error;
pub mod gate;
pub mod jwt;
pub mod middleware;
pub mod models;
