//! Public API
//!
//! Unauthenticated transparency endpoints.

use axum::{Json, Router, extract::State, routing::get};
use shared::ApiResponse;
use shared::models::PublicSummary;

use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/public/summary", get(summary))
}

/// GET /api/public/summary
async fn summary(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<PublicSummary>>> {
    let summary = state.analytics.public_summary()?;
    Ok(Json(ApiResponse::success(summary)))
}
