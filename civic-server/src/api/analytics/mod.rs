//! Analytics API
//!
//! Dashboard aggregates, official-only.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/analytics", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/dashboard", get(handler::dashboard))
        .route("/heatmap", get(handler::heatmap))
        .route("/trends", get(handler::trends))
}
