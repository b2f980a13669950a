//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health        - Liveness check
//! GET  /health/ready  - Readiness check (probes the database)
//!
//! GET  /              - Static status page
//! GET  /callback      - Webhook verification handshake
//! POST /callback      - Webhook event delivery (signature-verified)
//! ```

pub mod health;
pub mod webhook;

use axum::Router;

use crate::state::AppState;

/// Combine all route modules into one router.
pub fn routes() -> Router<AppState> {
    Router::new().merge(health::router()).merge(webhook::router())
}
