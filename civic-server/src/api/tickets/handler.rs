//! Ticket API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::ApiResponse;
use shared::models::{Ticket, TicketAssign, TicketFilter, TicketStats, TicketStatusUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/tickets?status=&priority=&category=
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(filter): Query<TicketFilter>,
) -> AppResult<Json<ApiResponse<Vec<Ticket>>>> {
    let tickets = state.tickets.list(&filter, &user)?;
    Ok(Json(ApiResponse::success(tickets)))
}

/// GET /api/tickets/stats
pub async fn stats(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<TicketStats>>> {
    let stats = state.tickets.stats(&user)?;
    Ok(Json(ApiResponse::success(stats)))
}

/// GET /api/tickets/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Ticket>>> {
    let ticket = state.tickets.get(&id, &user)?;
    Ok(Json(ApiResponse::success(ticket)))
}

/// PATCH /api/tickets/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<TicketStatusUpdate>,
) -> AppResult<Json<ApiResponse<Ticket>>> {
    let ticket = state.tickets.update_status(&id, payload, &user).await?;
    Ok(Json(ApiResponse::success(ticket)))
}

/// POST /api/tickets/{id}/assign
pub async fn assign(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<TicketAssign>,
) -> AppResult<Json<ApiResponse<Ticket>>> {
    let ticket = state.tickets.assign(&id, payload, &user).await?;
    Ok(Json(ApiResponse::success(ticket)))
}
