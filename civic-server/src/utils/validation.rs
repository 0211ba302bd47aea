//! Input validation helpers
//!
//! Centralized text length constants and validation functions.

use shared::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Titles, categories, names
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, message bodies
pub const MAX_NOTE_LEN: usize = 2000;

/// Free-text locations
pub const MAX_ADDRESS_LEN: usize = 500;

/// URLs / image references
pub const MAX_URL_LEN: usize = 2048;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Passwords (minimum)
pub const MIN_PASSWORD_LEN: usize = 6;

/// Assignee phone digit count bounds (inclusive)
pub const MIN_PHONE_DIGITS: usize = 10;
pub const MAX_PHONE_DIGITS: usize = 15;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")).with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Pothole", "title", MAX_NAME_LEN).is_ok());
        let err = validate_required_text("   ", "title", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(validate_required_text(&"x".repeat(201), "title", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "photo", MAX_URL_LEN).is_ok());
        assert!(validate_optional_text(&Some("x".repeat(3000)), "photo", MAX_URL_LEN).is_err());
    }
}
