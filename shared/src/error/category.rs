//! Error category classification

use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 4xxx: Incident errors
/// - 5xxx: Ticket errors
/// - 6xxx: Account errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Incident errors (4xxx)
    Incident,
    /// Ticket errors (5xxx)
    Ticket,
    /// Account errors (6xxx)
    Account,
    /// System errors (9xxx, and unassigned ranges)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            4000..5000 => Self::Incident,
            5000..6000 => Self::Ticket,
            6000..7000 => Self::Account,
            _ => Self::System,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(2), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1004), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2003), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Incident);
        assert_eq!(ErrorCategory::from_code(5003), ErrorCategory::Ticket);
        assert_eq!(ErrorCategory::from_code(6002), ErrorCategory::Account);
        assert_eq!(ErrorCategory::from_code(9004), ErrorCategory::System);
    }

    #[test]
    fn test_code_category() {
        assert_eq!(ErrorCode::DeliveryFailed.category(), ErrorCategory::System);
        assert_eq!(ErrorCode::InvalidStatus.category(), ErrorCategory::Ticket);
    }
}
