//! Notification Dispatcher
//!
//! Email goes through [`Mailer`] (validated, retried); SMS and WhatsApp go
//! through a [`MessagingGateway`] (single attempt). Every leg reports a
//! [`NotifyOutcome`] and the caller picks the policy.

pub mod email;
pub mod messaging;
pub mod templates;

use std::sync::Arc;

pub use email::{
    DeliveryError, DeliveryReport, MailTransport, Mailer, OutgoingEmail, SmtpMailTransport,
    TransportError,
};
pub use messaging::{Channel, MessagingError, MessagingGateway, TwilioGateway};

/// Result of one best-effort notification leg
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Delivered,
    /// Nothing to send to
    Skipped(String),
    /// Attempted and failed; already logged
    Failed(String),
}

impl NotifyOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

#[derive(Clone)]
pub struct Notifier {
    mailer: Mailer,
    gateway: Arc<dyn MessagingGateway>,
}

impl Notifier {
    pub fn new(mailer: Mailer, gateway: Arc<dyn MessagingGateway>) -> Self {
        Self { mailer, gateway }
    }

    /// Deliver an email, surfacing the failure
    ///
    /// For flows where the user depends on the email arriving.
    pub async fn deliver_email(&self, email: OutgoingEmail) -> Result<DeliveryReport, DeliveryError> {
        self.mailer.send(email).await
    }

    /// Best-effort email leg
    pub async fn email(&self, leg: &str, email: OutgoingEmail) -> NotifyOutcome {
        if email.to.trim().is_empty() {
            tracing::info!(leg, "Email skipped, no recipient");
            return NotifyOutcome::Skipped("no recipient".into());
        }
        match self.mailer.send(email).await {
            Ok(_) => NotifyOutcome::Delivered,
            Err(e) => {
                tracing::warn!(leg, error = %e, "Email notification failed");
                NotifyOutcome::Failed(e.to_string())
            }
        }
    }

    /// Best-effort SMS/WhatsApp leg
    pub async fn message(&self, leg: &str, channel: Channel, phone: &str, text: &str) -> NotifyOutcome {
        if phone.trim().is_empty() {
            return NotifyOutcome::Skipped("no phone".into());
        }
        match self.gateway.send(channel, phone, text).await {
            Ok(()) => NotifyOutcome::Delivered,
            Err(e) => {
                tracing::warn!(leg, channel = %channel, error = %e, "Message notification failed");
                NotifyOutcome::Failed(e.to_string())
            }
        }
    }

    /// SMS then WhatsApp to the same phone
    pub async fn text_both(&self, leg: &str, phone: &str, text: &str) -> [NotifyOutcome; 2] {
        [
            self.message(leg, Channel::Sms, phone, text).await,
            self.message(leg, Channel::Whatsapp, phone, text).await,
        ]
    }
}
