//! HTTP control API
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`sync`] - trigger entrypoints and status
//! - [`settings`] - live settings read/update

pub mod health;
pub mod settings;
pub mod sync;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Assemble the full router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api", sync::router().merge(settings::router()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
