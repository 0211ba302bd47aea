//! API response envelope
//!
//! Every endpoint answers with the same shape:
//! ```json
//! { "success": true, "data": { ... } }
//! { "success": false, "code": 5003, "message": "...", "details": { ... } }
//! ```

use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Unified API response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// Response payload (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error code (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    /// Human-readable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            code: None,
            message: None,
            details: None,
        }
    }

    /// Create a success response with a message alongside the data
    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }
}

impl ApiResponse<()> {
    /// Create a success response without data
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            code: None,
            message: None,
            details: None,
        }
    }

    /// Create an error response from an AppError
    pub fn error(err: &AppError) -> Self {
        Self {
            success: false,
            data: None,
            code: Some(err.code),
            message: Some(err.message.clone()),
            details: err.details.clone(),
        }
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            success: false,
            data: None,
            code: Some(err.code),
            message: Some(err.message),
            details: err.details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_shape() {
        let json = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": 42}));
    }

    #[test]
    fn test_ok_without_data() {
        let json = serde_json::to_value(ApiResponse::<()>::ok()).unwrap();
        assert_eq!(json, serde_json::json!({"success": true}));
    }

    #[test]
    fn test_error_shape() {
        let err = AppError::new(ErrorCode::ReopenNotAllowed).with_detail("ticket_id", "abc");
        let json = serde_json::to_value(ApiResponse::<()>::error(&err)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], 5003);
        assert_eq!(
            json["message"],
            "Only a head supervisor can reopen a resolved ticket"
        );
        assert_eq!(json["details"]["ticket_id"], "abc");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_from_error() {
        let response: ApiResponse<String> = AppError::internal("boom").into();
        assert!(!response.success);
        assert_eq!(response.code, Some(ErrorCode::InternalError));
        assert_eq!(response.message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_deserialize() {
        let response: ApiResponse<i32> =
            serde_json::from_str(r#"{"success":true,"data":7}"#).unwrap();
        assert!(response.success);
        assert_eq!(response.data, Some(7));
    }
}
