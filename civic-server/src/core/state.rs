//! Server State
//!
//! Built once at start-up and cloned into every handler. All fields are
//! cheap handles over shared resources.

use std::sync::Arc;

use crate::auth::{JwtConfig, JwtService};
use crate::core::{Config, Result};
use crate::db::Store;
use crate::db::repository::{UserDirectory, UserRepository};
use crate::live::LiveHub;
use crate::notify::{Mailer, MessagingGateway, Notifier, TwilioGateway};
use crate::services::{AnalyticsService, IncidentService, PasswordResetService, TicketService};

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Store,
    pub jwt_service: Arc<JwtService>,
    /// Live dashboard sessions
    pub hub: LiveHub,
    pub incidents: IncidentService,
    pub tickets: TicketService,
    pub analytics: AnalyticsService,
    pub password_reset: PasswordResetService,
}

impl ServerState {
    /// Wire services over an opened store and a notifier
    pub fn new(config: Config, store: Store, notifier: Notifier) -> Self {
        let hub = LiveHub::new();
        let users = UserRepository::new(&store, config.messaging.default_country_code.clone());
        let directory: Arc<dyn UserDirectory> = Arc::new(users.clone());

        let tickets = TicketService::new(&store, directory, hub.clone(), notifier.clone());
        let incidents = IncidentService::new(
            &store,
            tickets.clone(),
            hub.clone(),
            notifier.clone(),
            config.alerts.clone(),
        );
        let analytics = AnalyticsService::new(&store);
        let password_reset = PasswordResetService::new(
            &store,
            users,
            notifier,
            config.public_domain.clone(),
            config.password_reset_expire_minutes,
        );
        let jwt_service = Arc::new(JwtService::with_config(JwtConfig::new(
            config.jwt_secret.clone(),
        )));

        Self {
            config,
            store,
            jwt_service,
            hub,
            incidents,
            tickets,
            analytics,
            password_reset,
        }
    }

    /// Open the on-disk store and build the real SMTP/Twilio notifier
    pub fn initialize(config: &Config) -> Result<Self> {
        let path = config.database_path();
        let store = Store::open(&path)?;
        tracing::info!(path = %path.display(), "Document store opened");

        let mailer = Mailer::from_settings(config.email.clone());
        let gateway: Arc<dyn MessagingGateway> =
            Arc::new(TwilioGateway::new(config.messaging.clone()));
        Ok(Self::new(
            config.clone(),
            store,
            Notifier::new(mailer, gateway),
        ))
    }
}
