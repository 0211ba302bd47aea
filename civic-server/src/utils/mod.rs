//! Utility module
//!
//! - [`logger`]: tracing subscriber setup
//! - [`phone`]: phone normalization and variant matching
//! - [`validation`]: text length checks

pub mod logger;
pub mod phone;
pub mod validation;

pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};
