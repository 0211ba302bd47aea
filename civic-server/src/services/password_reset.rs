//! Password reset flow
//!
//! The request step answers the same way whether or not an account
//! exists. Tokens are single-use and expire.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use shared::models::{ForgotPasswordRequest, PasswordReset, ResetPasswordRequest, User};
use shared::util::{is_valid_email, new_id, now_iso, now_millis};
use shared::{AppError, AppResult, ErrorCode};

use crate::db::Store;
use crate::db::repository::{PasswordResetRepository, UserDirectory, UserRepository};
use crate::notify::{Notifier, templates};
use crate::utils::validation::{MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};

pub const NEUTRAL_RESPONSE: &str = "If the account exists, a reset link was sent";
pub const LINK_SENT: &str = "Password reset link sent";
pub const PASSWORD_UPDATED: &str = "Password updated";

/// Random bytes behind each token
const TOKEN_BYTES: usize = 32;

#[derive(Clone)]
pub struct PasswordResetService {
    users: UserRepository,
    resets: PasswordResetRepository,
    notifier: Notifier,
    public_domain: String,
    expire_minutes: i64,
}

/// URL-safe random token
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl PasswordResetService {
    pub fn new(
        store: &Store,
        users: UserRepository,
        notifier: Notifier,
        public_domain: impl Into<String>,
        expire_minutes: i64,
    ) -> Self {
        Self {
            users,
            resets: PasswordResetRepository::new(store),
            notifier,
            public_domain: public_domain.into(),
            expire_minutes,
        }
    }

    /// Issue a token and email the reset link
    ///
    /// Delivery failure is surfaced: the user is waiting for this email.
    pub async fn request_reset(&self, req: ForgotPasswordRequest) -> AppResult<&'static str> {
        let email = non_blank(req.email.as_deref());
        let phone = non_blank(req.phone.as_deref());
        if email.is_none() && phone.is_none() {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "Email or phone required",
            ));
        }

        let now_ms = now_millis();
        let purged = self.resets.purge_expired(now_ms)?;
        if purged > 0 {
            tracing::debug!(purged, "Purged expired reset tokens");
        }

        let user: Option<User> = match (email, phone) {
            (Some(e), _) => self.users.find_by_email(e)?,
            (None, Some(p)) => self.users.find_by_phone(p)?,
            (None, None) => None,
        };
        let Some(user) = user else {
            return Ok(NEUTRAL_RESPONSE);
        };
        let Some(target) = email
            .map(str::to_string)
            .or(user.email)
            .filter(|e| is_valid_email(e))
        else {
            return Ok(NEUTRAL_RESPONSE);
        };

        let token = generate_token();
        let record = PasswordReset {
            id: new_id(),
            token: token.clone(),
            email: target.clone(),
            expires_at: now_ms + self.expire_minutes * 60_000,
            used: false,
            used_at: None,
            created_at: now_iso(),
        };
        self.resets.create(&record)?;

        let link = format!("{}/reset-password?token={}", self.public_domain, token);
        self.notifier
            .deliver_email(templates::password_reset_email(
                &target,
                &link,
                self.expire_minutes,
            ))
            .await
            .map_err(|e| {
                tracing::warn!(user_id = %user.id, error = %e, "Password reset email failed");
                AppError::from(e)
            })?;

        tracing::info!(user_id = %user.id, "Password reset link sent");
        Ok(LINK_SENT)
    }

    /// Redeem a token and set the new password
    pub fn reset_password(&self, req: ResetPasswordRequest) -> AppResult<&'static str> {
        let len = req.password.chars().count();
        if len < MIN_PASSWORD_LEN {
            return Err(AppError::new(ErrorCode::PasswordTooShort).with_detail("min", MIN_PASSWORD_LEN));
        }
        if len > MAX_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "password is too long (max {MAX_PASSWORD_LEN})"
            ))
            .with_detail("field", "password"));
        }

        let token = req.token.trim();
        let now_ms = now_millis();
        let record = if token.is_empty() {
            None
        } else {
            self.resets.find_redeemable(token, now_ms)?
        };
        let Some(record) = record else {
            return Err(AppError::new(ErrorCode::ResetTokenInvalid));
        };

        let user = self
            .users
            .find_by_email(&record.email)?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

        let hash = hash_password(&req.password)
            .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

        // Claim the token first so two concurrent redemptions cannot both win
        let now = now_iso();
        if !self.resets.mark_used(&record.id, &now)? {
            return Err(AppError::new(ErrorCode::ResetTokenInvalid));
        }
        self.users.set_password_hash(&user.id, hash, &now)?;

        tracing::info!(user_id = %user.id, "Password updated via reset token");
        Ok(PASSWORD_UPDATED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        // 32 bytes -> 43 unpadded base64 chars
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_hash_password_is_argon2() {
        let hash = hash_password("secret123").unwrap();
        assert!(hash.starts_with("$argon2"));
    }
}
