//! Password-reset Handlers

use axum::{Json, extract::State};
use serde::Serialize;
use shared::ApiResponse;
use shared::models::{ForgotPasswordRequest, ResetPasswordRequest};

use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Serialize)]
pub struct MessageBody {
    message: &'static str,
}

/// POST /api/auth/forgot-password
///
/// Unknown accounts get the same neutral answer as known ones.
pub async fn forgot_password(
    State(state): State<ServerState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<MessageBody>>> {
    let message = state.password_reset.request_reset(payload).await?;
    Ok(Json(ApiResponse::success(MessageBody { message })))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<ServerState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<MessageBody>>> {
    let message = state.password_reset.reset_password(payload)?;
    Ok(Json(ApiResponse::success(MessageBody { message })))
}
