//! HTTP API
//!
//! - [`health`]: liveness check
//! - [`incidents`]: incident CRUD, messages, edge-device reports
//! - [`tickets`]: ticket reads, status changes, assignment
//! - [`analytics`]: dashboard aggregates, heatmap and trends
//! - [`public`]: unauthenticated summary
//! - [`auth`]: password-reset flow
//! - [`live`]: dashboard WebSocket sessions

pub mod analytics;
pub mod auth;
pub mod health;
pub mod incidents;
pub mod live;
pub mod public;
pub mod tickets;

use axum::Router;

use crate::core::ServerState;

/// All routes, before state and layers are applied
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(incidents::router())
        .merge(tickets::router())
        .merge(analytics::router())
        .merge(public::router())
        .merge(auth::router())
        .merge(live::router())
}
