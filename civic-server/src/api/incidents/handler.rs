//! Incident API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::models::{
    DetectionReport, Incident, IncidentCreate, IncidentStats, IncidentUpdate, Message,
    MessageCreate,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::ApiResponse;

/// GET /api/incidents - officials see all, everyone else their own
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<Incident>>>> {
    let incidents = state.incidents.list(&user)?;
    Ok(Json(ApiResponse::success(incidents)))
}

/// GET /api/incidents/stats
pub async fn stats(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<IncidentStats>>> {
    let stats = state.incidents.stats(&user)?;
    Ok(Json(ApiResponse::success(stats)))
}

/// POST /api/incidents - persists the incident and derives its ticket
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<IncidentCreate>,
) -> AppResult<Json<ApiResponse<Incident>>> {
    let incident = state.incidents.create(payload, Some(&user)).await?;
    Ok(Json(ApiResponse::success(incident)))
}

/// POST /api/report - edge-device detection, no caller identity
pub async fn report(
    State(state): State<ServerState>,
    Json(payload): Json<DetectionReport>,
) -> AppResult<Json<ApiResponse<Incident>>> {
    let incident = state.incidents.report(payload).await?;
    Ok(Json(ApiResponse::success(incident)))
}

/// GET /api/incidents/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Incident>>> {
    let incident = state.incidents.get(&id, &user)?;
    Ok(Json(ApiResponse::success(incident)))
}

/// PUT /api/incidents/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<IncidentUpdate>,
) -> AppResult<Json<ApiResponse<Incident>>> {
    let incident = state.incidents.update(&id, payload, &user).await?;
    Ok(Json(ApiResponse::success(incident)))
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    id: String,
}

/// DELETE /api/incidents/{id} - cascades to tickets and messages
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    state.incidents.delete(&id, &user)?;
    Ok(Json(ApiResponse::success_with_message(
        "Incident deleted",
        Deleted { id },
    )))
}

/// GET /api/incidents/{id}/messages
pub async fn list_messages(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<Message>>>> {
    let messages = state.incidents.list_messages(&id, &user)?;
    Ok(Json(ApiResponse::success(messages)))
}

/// POST /api/incidents/{id}/messages
pub async fn create_message(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<MessageCreate>,
) -> AppResult<Json<ApiResponse<Message>>> {
    let message = state.incidents.create_message(&id, payload, &user)?;
    Ok(Json(ApiResponse::success(message)))
}
