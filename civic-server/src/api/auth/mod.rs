//! Password-reset API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/auth/forgot-password | POST | none |
//! | /api/auth/reset-password | POST | none |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/forgot-password", post(handler::forgot_password))
        .route("/api/auth/reset-password", post(handler::reset_password))
}
