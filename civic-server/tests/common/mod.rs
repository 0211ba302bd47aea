//! Shared fixtures for the service-level tests
//!
//! Services run against an in-memory store. Email and SMS/WhatsApp go to
//! recording fakes that can be switched to fail.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use civic_server::core::config::Config;
use civic_server::db::Store;
use civic_server::db::repository::UserRepository;
use civic_server::notify::{
    Channel, MailTransport, Mailer, MessagingError, MessagingGateway, Notifier, OutgoingEmail,
    TransportError,
};
use civic_server::ServerState;
use shared::models::{Actor, IncidentCreate, Role, User};
use shared::util::{new_id, now_iso};

#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub attempts: Mutex<u32>,
    pub failing: AtomicBool,
}

impl RecordingTransport {
    pub fn fail(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, to: &str) -> Vec<OutgoingEmail> {
        self.sent().into_iter().filter(|e| e.to == to).collect()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), TransportError> {
        *self.attempts.lock().unwrap() += 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Transient("relay unavailable".into()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingGateway {
    pub sent: Mutex<Vec<(Channel, String, String)>>,
    pub failing: AtomicBool,
}

impl RecordingGateway {
    pub fn fail(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(Channel, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn send(&self, channel: Channel, to: &str, body: &str) -> Result<(), MessagingError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MessagingError::Timeout);
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel, to.to_string(), body.to_string()));
        Ok(())
    }
}

pub struct Harness {
    pub state: ServerState,
    pub store: Store,
    pub users: UserRepository,
    pub mail: Arc<RecordingTransport>,
    pub messages: Arc<RecordingGateway>,
}

pub fn harness() -> Harness {
    harness_with(Config::for_tests())
}

pub fn harness_with(config: Config) -> Harness {
    let store = Store::open_in_memory().unwrap();
    let mail = Arc::new(RecordingTransport::default());
    let messages = Arc::new(RecordingGateway::default());

    let mailer = Mailer::new(config.email.clone(), mail.clone());
    let notifier = Notifier::new(mailer, messages.clone());
    let users = UserRepository::new(&store, config.messaging.default_country_code.clone());
    let state = ServerState::new(config, store.clone(), notifier);

    Harness {
        state,
        store,
        users,
        mail,
        messages,
    }
}

pub fn actor(id: &str, name: &str, role: Role) -> Actor {
    Actor {
        id: id.into(),
        name: name.into(),
        email: None,
        phone: None,
        role,
    }
}

pub fn citizen() -> Actor {
    Actor {
        email: Some("asha@example.com".into()),
        phone: Some("9876501234".into()),
        ..actor("u1", "Asha", Role::Citizen)
    }
}

pub fn official() -> Actor {
    actor("o1", "Officer Rao", Role::Official)
}

pub fn supervisor() -> Actor {
    actor("s1", "Head Supervisor Iyer", Role::HeadSupervisor)
}

pub fn pothole() -> IncidentCreate {
    IncidentCreate {
        title: "Pothole".into(),
        category: "road".into(),
        location: "Main St".into(),
        ..Default::default()
    }
}

pub fn seed_user(users: &UserRepository, name: &str, email: Option<&str>, phone: Option<&str>, role: Role) -> User {
    let now = now_iso();
    let user = User {
        id: new_id(),
        name: name.into(),
        email: email.map(str::to_string),
        phone: phone.map(str::to_string),
        user_type: role,
        password_hash: None,
        created_at: now.clone(),
        updated_at: now,
    };
    users.create(&user).unwrap();
    user
}
