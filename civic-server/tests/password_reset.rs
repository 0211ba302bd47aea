mod common;

use common::{harness, seed_user};
use civic_server::services::password_reset::{LINK_SENT, NEUTRAL_RESPONSE, PASSWORD_UPDATED};
use http::StatusCode;
use shared::ErrorCode;
use shared::models::{ForgotPasswordRequest, ResetPasswordRequest, Role};

fn by_email(email: &str) -> ForgotPasswordRequest {
    ForgotPasswordRequest {
        email: Some(email.into()),
        phone: None,
    }
}

fn token_from(text: &str) -> String {
    let start = text.find("token=").unwrap() + "token=".len();
    text[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

#[tokio::test]
async fn test_reset_flow_is_single_use() {
    let h = harness();
    seed_user(&h.users, "Asha", Some("asha@example.com"), None, Role::Citizen);

    // 1. request, email case does not matter
    let answer = h
        .state
        .password_reset
        .request_reset(by_email("ASHA@example.com"))
        .await
        .unwrap();
    assert_eq!(answer, LINK_SENT);

    let sent = h.mail.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "SafeLive Password Reset");
    assert!(sent[0].text.contains("https://safelive.in/reset-password?token="));
    let token = token_from(&sent[0].text);
    assert_eq!(token.len(), 43);

    // 2. redeem
    let done = h
        .state
        .password_reset
        .reset_password(ResetPasswordRequest {
            token: token.clone(),
            password: "new-secret".into(),
        })
        .unwrap();
    assert_eq!(done, PASSWORD_UPDATED);

    use civic_server::db::repository::UserDirectory;
    let user = h.users.find_by_email("asha@example.com").unwrap().unwrap();
    assert!(user.password_hash.unwrap().starts_with("$argon2"));

    // 3. second redemption fails
    let err = h
        .state
        .password_reset
        .reset_password(ResetPasswordRequest {
            token,
            password: "another-secret".into(),
        })
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResetTokenInvalid);
    assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_account_gets_neutral_answer() {
    let h = harness();
    let answer = h
        .state
        .password_reset
        .request_reset(by_email("nobody@example.com"))
        .await
        .unwrap();
    assert_eq!(answer, NEUTRAL_RESPONSE);
    assert!(h.mail.sent().is_empty());
}

#[tokio::test]
async fn test_lookup_by_phone_sends_to_account_email() {
    let h = harness();
    seed_user(
        &h.users,
        "Ravi",
        Some("ravi@example.com"),
        Some("+91 98765 43210"),
        Role::Citizen,
    );
    let answer = h
        .state
        .password_reset
        .request_reset(ForgotPasswordRequest {
            email: None,
            phone: Some("09876543210".into()),
        })
        .await
        .unwrap();
    assert_eq!(answer, LINK_SENT);
    assert_eq!(h.mail.sent_to("ravi@example.com").len(), 1);
}

#[tokio::test]
async fn test_account_without_email_gets_neutral_answer() {
    let h = harness();
    seed_user(&h.users, "Kiran", None, Some("9876500000"), Role::Citizen);
    let answer = h
        .state
        .password_reset
        .request_reset(ForgotPasswordRequest {
            email: None,
            phone: Some("9876500000".into()),
        })
        .await
        .unwrap();
    assert_eq!(answer, NEUTRAL_RESPONSE);
    assert!(h.mail.sent().is_empty());
}

#[tokio::test]
async fn test_reset_email_failure_is_surfaced() {
    let h = harness();
    seed_user(&h.users, "Asha", Some("asha@example.com"), None, Role::Citizen);
    h.mail.fail(true);

    let err = h
        .state
        .password_reset
        .request_reset(by_email("asha@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DeliveryFailed);
    assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(*h.mail.attempts.lock().unwrap(), 3);
}

#[tokio::test]
async fn test_request_needs_email_or_phone() {
    let h = harness();
    let err = h
        .state
        .password_reset
        .request_reset(ForgotPasswordRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RequiredField);
}

#[tokio::test]
async fn test_short_password_and_unknown_token() {
    let h = harness();
    let err = h
        .state
        .password_reset
        .reset_password(ResetPasswordRequest {
            token: "whatever".into(),
            password: "12345".into(),
        })
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PasswordTooShort);

    let err = h
        .state
        .password_reset
        .reset_password(ResetPasswordRequest {
            token: "not-a-real-token".into(),
            password: "long-enough".into(),
        })
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResetTokenInvalid);
}
