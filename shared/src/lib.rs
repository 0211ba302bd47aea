//! Shared types for the civic incident platform
//!
//! Common types used by the server and its clients: the error system,
//! the response envelope, entity records, live-event payloads and small
//! utilities (timestamps, document ids).

pub mod error;
pub mod event;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use event::{LiveEvent, LiveEventType};
pub use response::ApiResponse;
