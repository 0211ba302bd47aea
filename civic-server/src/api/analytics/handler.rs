//! Analytics API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use shared::ApiResponse;
use shared::models::{Dashboard, HeatPoint, TrendPoint, TrendQuery};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/analytics/dashboard
pub async fn dashboard(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Dashboard>>> {
    let dashboard = state.analytics.dashboard(&user)?;
    Ok(Json(ApiResponse::success(dashboard)))
}

/// GET /api/analytics/heatmap
pub async fn heatmap(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<HeatPoint>>>> {
    let points = state.analytics.heatmap(&user)?;
    Ok(Json(ApiResponse::success(points)))
}

/// GET /api/analytics/trends?days=
pub async fn trends(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<TrendQuery>,
) -> AppResult<Json<ApiResponse<Vec<TrendPoint>>>> {
    let points = state.analytics.trends(&query, &user)?;
    Ok(Json(ApiResponse::success(points)))
}
