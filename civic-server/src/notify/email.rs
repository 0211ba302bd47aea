//! Email delivery with bounded retry
//!
//! [`Mailer`] owns the retry policy; the wire work sits behind
//! [`MailTransport`] so the policy can be driven without a relay.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use shared::AppError;
use shared::util::is_valid_email;
use thiserror::Error;

use crate::core::config::EmailSettings;

/// SMTP reply codes that mean the credentials were refused
const AUTH_FAILURE_CODES: [&str; 3] = ["530", "534", "535"];

/// A fully rendered email
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub subject: String,
    pub to: String,
    pub text: String,
    pub html: Option<String>,
}

/// Failure of a single send attempt
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("SMTP authentication failed: {0}")]
    Auth(String),

    #[error("SMTP attempt timed out")]
    Timeout,

    #[error("{0}")]
    Transient(String),

    /// The message itself could not be built; retrying cannot help
    #[error("invalid message: {0}")]
    Message(String),
}

/// One attempt at handing an email to the relay
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), TransportError>;
}

/// Final outcome of a failed delivery
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    #[error("Recipient email is required")]
    MissingRecipient,

    #[error("Invalid recipient email: {0}")]
    InvalidRecipient(String),

    #[error("Email service not configured: {0}")]
    NotConfigured(String),

    #[error("SMTP authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Unable to build email: {0}")]
    InvalidMessage(String),

    #[error("Unable to deliver email to {to} after {attempts} attempt(s): {cause}")]
    Exhausted {
        to: String,
        attempts: u32,
        cause: String,
    },
}

impl From<DeliveryError> for AppError {
    fn from(err: DeliveryError) -> Self {
        AppError::delivery(err.to_string())
    }
}

/// Successful delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub to: String,
    pub subject: String,
    pub attempts: u32,
}

/// Retrying email sender
#[derive(Clone)]
pub struct Mailer {
    settings: EmailSettings,
    transport: Option<Arc<dyn MailTransport>>,
}

impl Mailer {
    pub fn new(settings: EmailSettings, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            settings,
            transport: Some(transport),
        }
    }

    /// Build the SMTP transport from settings
    ///
    /// A relay that cannot be set up is logged and reported as
    /// `NotConfigured` on every send, so the server still starts.
    pub fn from_settings(settings: EmailSettings) -> Self {
        let transport = match SmtpMailTransport::new(&settings) {
            Ok(t) => Some(Arc::new(t) as Arc<dyn MailTransport>),
            Err(e) => {
                if settings.enabled {
                    tracing::warn!(error = %e, "SMTP transport unavailable");
                }
                None
            }
        };
        Self {
            settings,
            transport,
        }
    }

    pub fn settings(&self) -> &EmailSettings {
        &self.settings
    }

    fn check_configuration(&self) -> Result<(), DeliveryError> {
        let s = &self.settings;
        let missing = if !s.enabled {
            Some("email delivery is disabled (EMAIL_ENABLED=false)")
        } else if s.user.trim().is_empty() {
            Some("EMAIL_USER is missing")
        } else if s.password.is_empty() {
            Some("EMAIL_PASS is missing")
        } else if s.from.trim().is_empty() {
            Some("EMAIL_FROM is missing")
        } else if s.smtp_port == 0 {
            Some("SMTP_PORT must be a positive integer")
        } else if s.max_retries == 0 {
            Some("EMAIL_MAX_RETRIES must be a positive integer")
        } else {
            None
        };
        match missing {
            Some(reason) => Err(DeliveryError::NotConfigured(reason.to_string())),
            None => Ok(()),
        }
    }

    /// Deliver `email`, retrying transport failures with linear backoff
    ///
    /// The recipient is validated before any network call. An
    /// authentication failure stops immediately.
    pub async fn send(&self, mut email: OutgoingEmail) -> Result<DeliveryReport, DeliveryError> {
        self.check_configuration()?;
        email.to = validate_recipient(&email.to)?;
        email.subject = email.subject.trim().to_string();

        let transport = self
            .transport
            .as_ref()
            .ok_or_else(|| DeliveryError::NotConfigured("SMTP transport unavailable".into()))?;

        let max_attempts = self.settings.max_retries;
        let mut last_error = String::from("unknown error");

        for attempt in 1..=max_attempts {
            let result = tokio::time::timeout(self.settings.timeout, transport.send(&email))
                .await
                .unwrap_or(Err(TransportError::Timeout));

            match result {
                Ok(()) => {
                    tracing::info!(
                        to = %email.to,
                        subject = %email.subject,
                        attempt,
                        "Email sent"
                    );
                    return Ok(DeliveryReport {
                        to: email.to,
                        subject: email.subject,
                        attempts: attempt,
                    });
                }
                Err(TransportError::Auth(cause)) => {
                    tracing::error!(
                        user = %self.settings.user,
                        error = %cause,
                        "SMTP authentication failed, check the relay credentials"
                    );
                    return Err(DeliveryError::AuthenticationFailed(cause));
                }
                Err(TransportError::Message(cause)) => {
                    return Err(DeliveryError::InvalidMessage(cause));
                }
                Err(e) => {
                    last_error = e.to_string();
                    tracing::warn!(
                        to = %email.to,
                        attempt,
                        max_attempts,
                        error = %last_error,
                        "Email send attempt failed"
                    );
                    if attempt < max_attempts {
                        tokio::time::sleep(self.settings.retry_backoff * attempt).await;
                    }
                }
            }
        }

        Err(DeliveryError::Exhausted {
            to: email.to,
            attempts: max_attempts,
            cause: last_error,
        })
    }
}

/// Trimmed recipient, or the reason it is unusable
pub fn validate_recipient(to: &str) -> Result<String, DeliveryError> {
    let recipient = to.trim();
    if recipient.is_empty() {
        return Err(DeliveryError::MissingRecipient);
    }
    if !is_valid_email(recipient) {
        return Err(DeliveryError::InvalidRecipient(recipient.to_string()));
    }
    Ok(recipient.to_string())
}

/// lettre-backed SMTP transport
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    reply_to: Option<Mailbox>,
}

impl SmtpMailTransport {
    pub fn new(settings: &EmailSettings) -> Result<Self, DeliveryError> {
        let from_address: Address = settings
            .from
            .trim()
            .parse()
            .map_err(|e| DeliveryError::NotConfigured(format!("invalid EMAIL_FROM: {e}")))?;
        let from_name = settings.from_name.trim();
        let from = Mailbox::new(
            (!from_name.is_empty()).then(|| from_name.to_string()),
            from_address,
        );
        let reply_to = match settings.reply_to.as_deref() {
            Some(r) => Some(
                r.trim()
                    .parse::<Mailbox>()
                    .map_err(|e| DeliveryError::NotConfigured(format!("invalid EMAIL_REPLY_TO: {e}")))?,
            ),
            None => None,
        };

        let builder = if settings.use_ssl {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)
        } else if settings.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
        } else {
            Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
                &settings.smtp_host,
            ))
        }
        .map_err(|e| DeliveryError::NotConfigured(format!("Failed to create SMTP transport: {e}")))?;

        let transport = builder
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.password.clone(),
            ))
            .port(settings.smtp_port)
            .timeout(Some(settings.timeout))
            .build();

        Ok(Self {
            transport,
            from,
            reply_to,
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, TransportError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| TransportError::Message(format!("Invalid to address: {e}")))?;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone());
        if let Some(reply_to) = &self.reply_to {
            builder = builder.reply_to(reply_to.clone());
        }

        let message = match &email.html {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                html.clone(),
            )),
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(email.text.clone()),
        };
        message.map_err(|e| TransportError::Message(e.to_string()))
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), TransportError> {
        let message = self.build_message(email)?;
        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(classify_smtp_error)
    }
}

fn classify_smtp_error(err: lettre::transport::smtp::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout;
    }
    match err.status() {
        Some(code) if AUTH_FAILURE_CODES.contains(&code.to_string().as_str()) => {
            TransportError::Auth(err.to_string())
        }
        _ => TransportError::Transient(err.to_string()),
    }
}
