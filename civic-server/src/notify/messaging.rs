//! SMS and WhatsApp delivery
//!
//! One outbound call per message, no retry. Callers decide whether a
//! failure matters; in practice it is logged and dropped.

use async_trait::async_trait;
use thiserror::Error;

use crate::core::config::MessagingSettings;
use crate::utils::phone::normalize_phone;

/// Outbound text channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Sms,
    Whatsapp,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::Whatsapp => "whatsapp",
        }
    }

    /// Address form expected by the gateway
    fn address(&self, phone: &str) -> String {
        match self {
            Self::Sms => phone.to_string(),
            Self::Whatsapp => format!("whatsapp:{phone}"),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
pub enum MessagingError {
    #[error("Twilio credentials missing")]
    MissingCredentials,

    #[error("{0} phone configuration missing")]
    MissingPhone(&'static str),

    #[error("messaging request timed out")]
    Timeout,

    #[error("messaging request failed: {0}")]
    Request(String),

    #[error("messaging API returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Single-shot text message delivery
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send(&self, channel: Channel, to: &str, body: &str) -> Result<(), MessagingError>;
}

/// Twilio REST gateway
pub struct TwilioGateway {
    client: reqwest::Client,
    settings: MessagingSettings,
}

impl TwilioGateway {
    pub fn new(settings: MessagingSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self { client, settings }
    }

    fn sender(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Sms => self.settings.sms_from.as_deref(),
            Channel::Whatsapp => self.settings.whatsapp_from.as_deref(),
        }
    }
}

#[async_trait]
impl MessagingGateway for TwilioGateway {
    async fn send(&self, channel: Channel, to: &str, body: &str) -> Result<(), MessagingError> {
        let cc = &self.settings.default_country_code;
        let to = normalize_phone(to, cc);
        let from = normalize_phone(self.sender(channel).unwrap_or_default(), cc);
        if to.is_empty() || from.is_empty() {
            return Err(MessagingError::MissingPhone(match channel {
                Channel::Sms => "SMS",
                Channel::Whatsapp => "WhatsApp",
            }));
        }

        let (Some(sid), Some(token)) = (
            self.settings.account_sid.as_deref(),
            self.settings.auth_token.as_deref(),
        ) else {
            return Err(MessagingError::MissingCredentials);
        };

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.settings.api_base.trim_end_matches('/'),
            sid
        );
        let form = [
            ("To", channel.address(&to)),
            ("From", channel.address(&from)),
            ("Body", body.to_string()),
        ];

        let resp = self
            .client
            .post(&url)
            .basic_auth(sid, Some(token))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MessagingError::Timeout
                } else {
                    MessagingError::Request(e.to_string())
                }
            })?;

        let status = resp.status();
        if status.is_success() {
            tracing::debug!(channel = %channel, to = %to, "Message accepted");
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(MessagingError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_phone_checked_first() {
        let gateway = TwilioGateway::new(MessagingSettings::default());
        let err = gateway
            .send(Channel::Sms, "9876543210", "hello")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "SMS phone configuration missing");

        let err = gateway.send(Channel::Whatsapp, "", "hello").await.unwrap_err();
        assert_eq!(err.to_string(), "WhatsApp phone configuration missing");
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let gateway = TwilioGateway::new(MessagingSettings {
            sms_from: Some("+15550001111".into()),
            ..MessagingSettings::default()
        });
        let err = gateway
            .send(Channel::Sms, "9876543210", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, MessagingError::MissingCredentials));
    }

    #[test]
    fn test_whatsapp_address_prefix() {
        assert_eq!(Channel::Whatsapp.address("+919876543210"), "whatsapp:+919876543210");
        assert_eq!(Channel::Sms.address("+919876543210"), "+919876543210");
    }
}
