//! Unified error codes for the civic incident platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Incident errors
//! - 5xxx: Ticket errors
//! - 6xxx: Account errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format (e.g. malformed document id)
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Official role required
    OfficialRequired = 2002,
    /// Head supervisor capability required
    SupervisorRequired = 2003,

    // ==================== 4xxx: Incident ====================
    /// Incident not found
    IncidentNotFound = 4001,
    /// Incident access denied (not the reporter)
    IncidentAccessDenied = 4002,

    // ==================== 5xxx: Ticket ====================
    /// Ticket not found
    TicketNotFound = 5001,
    /// Status value outside the ticket state machine
    InvalidStatus = 5002,
    /// Reopening a resolved ticket without supervisor capability
    ReopenNotAllowed = 5003,
    /// Assignee name/phone/photo invalid
    InvalidAssignee = 5004,

    // ==================== 6xxx: Account ====================
    /// User not found
    UserNotFound = 6001,
    /// Password reset token invalid, used or expired
    ResetTokenInvalid = 6002,
    /// Password too short
    PasswordTooShort = 6003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Notification delivery failed (email/SMS/WhatsApp)
    DeliveryFailed = 9004,
    /// Network error
    NetworkError = 9005,
    /// Timeout error
    TimeoutError = 9006,
}

impl ErrorCode {
    /// Get the numeric code
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Default human-readable message
    pub fn message(&self) -> &'static str {
        match self {
            // General
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::InvalidFormat => "Invalid format",
            Self::RequiredField => "Required field missing",

            // Auth
            Self::NotAuthenticated => "Not authenticated",
            Self::InvalidCredentials => "Invalid credentials",
            Self::TokenExpired => "Token expired",
            Self::TokenInvalid => "Invalid token",

            // Permission
            Self::PermissionDenied => "Permission denied",
            Self::OfficialRequired => "Official access required",
            Self::SupervisorRequired => "Head supervisor access required",

            // Incident
            Self::IncidentNotFound => "Incident not found",
            Self::IncidentAccessDenied => "Access denied",

            // Ticket
            Self::TicketNotFound => "Ticket not found",
            Self::InvalidStatus => "Invalid ticket status",
            Self::ReopenNotAllowed => "Only a head supervisor can reopen a resolved ticket",
            Self::InvalidAssignee => "Invalid assignee",

            // Account
            Self::UserNotFound => "User not found",
            Self::ResetTokenInvalid => "Invalid or expired token",
            Self::PasswordTooShort => "Password too short",

            // System
            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::ConfigError => "Configuration error",
            Self::DeliveryFailed => "Notification delivery failed",
            Self::NetworkError => "Network error",
            Self::TimeoutError => "Operation timed out",
        }
    }

    /// Error category derived from the code range
    pub fn category(&self) -> super::ErrorCategory {
        super::ErrorCategory::from_code(self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::OfficialRequired),
            2003 => Ok(ErrorCode::SupervisorRequired),

            // Incident
            4001 => Ok(ErrorCode::IncidentNotFound),
            4002 => Ok(ErrorCode::IncidentAccessDenied),

            // Ticket
            5001 => Ok(ErrorCode::TicketNotFound),
            5002 => Ok(ErrorCode::InvalidStatus),
            5003 => Ok(ErrorCode::ReopenNotAllowed),
            5004 => Ok(ErrorCode::InvalidAssignee),

            // Account
            6001 => Ok(ErrorCode::UserNotFound),
            6002 => Ok(ErrorCode::ResetTokenInvalid),
            6003 => Ok(ErrorCode::PasswordTooShort),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9004 => Ok(ErrorCode::DeliveryFailed),
            9005 => Ok(ErrorCode::NetworkError),
            9006 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::IncidentNotFound.code(), 4001);
        assert_eq!(ErrorCode::ReopenNotAllowed.code(), 5003);
        assert_eq!(ErrorCode::ResetTokenInvalid.code(), 6002);
        assert_eq!(ErrorCode::DeliveryFailed.code(), 9004);
    }

    #[test]
    fn test_try_from_roundtrip() {
        for code in [
            ErrorCode::Success,
            ErrorCode::InvalidFormat,
            ErrorCode::TokenExpired,
            ErrorCode::SupervisorRequired,
            ErrorCode::IncidentAccessDenied,
            ErrorCode::InvalidAssignee,
            ErrorCode::PasswordTooShort,
            ErrorCode::TimeoutError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(3001), Err(InvalidErrorCode(3001)));
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::TicketNotFound).unwrap();
        assert_eq!(json, "5001");
        let code: ErrorCode = serde_json::from_str("5003").unwrap();
        assert_eq!(code, ErrorCode::ReopenNotAllowed);
    }
}
