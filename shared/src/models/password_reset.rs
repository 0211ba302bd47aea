//! Password Reset Model

use serde::{Deserialize, Serialize};

/// Single-use reset token record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    pub id: String,
    pub token: String,
    pub email: String,
    /// Unix millis
    pub expires_at: i64,
    #[serde(default)]
    pub used: bool,
    pub used_at: Option<String>,
    pub created_at: String,
}

impl PasswordReset {
    /// Unused and not yet expired at `now_ms`
    pub fn is_redeemable(&self, now_ms: i64) -> bool {
        !self.used && self.expires_at >= now_ms
    }
}

/// Forgot-password payload: email or phone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Reset-password payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(used: bool, expires_at: i64) -> PasswordReset {
        PasswordReset {
            id: "65f0c0ffee65f0c0ffee65f0".into(),
            token: "t".into(),
            email: "a@b.in".into(),
            expires_at,
            used,
            used_at: None,
            created_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn test_is_redeemable() {
        assert!(record(false, 2_000).is_redeemable(1_000));
        assert!(record(false, 1_000).is_redeemable(1_000));
        assert!(!record(false, 999).is_redeemable(1_000));
        assert!(!record(true, 2_000).is_redeemable(1_000));
    }
}
