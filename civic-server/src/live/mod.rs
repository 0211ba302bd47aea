//! LiveHub: dashboard fan-out
//!
//! ```text
//! IncidentService / TicketService
//!       │ LiveEvent {type, data}
//!       ▼
//! LiveHub::broadcast  (serialize once, snapshot sessions)
//!   ├── session A ── mpsc ──▶ WS writer
//!   ├── session B ── mpsc ──▶ WS writer
//!   └── session C ── closed ─▶ dropped
//! ```
//!
//! No history: a session only sees events broadcast after it connected.

use dashmap::DashMap;
use shared::LiveEvent;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Per-session outbound buffer; a session this far behind misses frames
const SESSION_BUFFER: usize = 64;

pub type SessionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("session closed")]
    Closed,
    #[error("session buffer full")]
    Full,
}

/// Outbound side of one live session
///
/// Must not block: a slow session cannot hold up the others.
pub trait LiveSink: Send + Sync {
    fn try_deliver(&self, frame: &str) -> Result<(), SinkError>;
}

impl LiveSink for mpsc::Sender<String> {
    fn try_deliver(&self, frame: &str) -> Result<(), SinkError> {
        self.try_send(frame.to_string()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::Full,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

/// Delivery counts of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: usize,
    pub skipped: usize,
}

/// Registry of live dashboard sessions
#[derive(Clone, Default)]
pub struct LiveHub {
    sessions: Arc<DashMap<SessionId, Arc<dyn LiveSink>>>,
}

impl LiveHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel-backed session; frames arrive on the receiver
    pub fn connect(&self) -> (SessionId, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(SESSION_BUFFER);
        let id = self.attach(Arc::new(tx));
        (id, rx)
    }

    /// Register an arbitrary sink
    pub fn attach(&self, sink: Arc<dyn LiveSink>) -> SessionId {
        let id = Uuid::new_v4();
        self.sessions.insert(id, sink);
        tracing::debug!(session = %id, total = self.sessions.len(), "Live session connected");
        id
    }

    pub fn disconnect(&self, id: &SessionId) {
        if self.sessions.remove(id).is_some() {
            tracing::debug!(session = %id, total = self.sessions.len(), "Live session disconnected");
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Deliver `event` to every session registered right now
    ///
    /// Each send is independent. Closed sessions are removed; full ones
    /// miss this frame.
    pub fn broadcast(&self, event: &LiveEvent) -> BroadcastReport {
        let frame = match serde_json::to_string(event) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize live event");
                return BroadcastReport::default();
            }
        };

        // Snapshot so no shard lock is held while sending
        let targets: Vec<(SessionId, Arc<dyn LiveSink>)> = self
            .sessions
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut report = BroadcastReport::default();
        for (id, sink) in targets {
            match sink.try_deliver(&frame) {
                Ok(()) => report.delivered += 1,
                Err(SinkError::Closed) => {
                    self.sessions.remove(&id);
                    report.dropped += 1;
                }
                Err(SinkError::Full) => {
                    tracing::warn!(session = %id, "Live session lagging, frame skipped");
                    report.skipped += 1;
                }
            }
        }

        if report.dropped > 0 {
            tracing::debug!(dropped = report.dropped, "Removed closed live sessions");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::LiveEventType;

    struct BrokenSink;

    impl LiveSink for BrokenSink {
        fn try_deliver(&self, _frame: &str) -> Result<(), SinkError> {
            Err(SinkError::Closed)
        }
    }

    fn event() -> LiveEvent {
        LiveEvent::new(LiveEventType::NewIncident, &serde_json::json!({"id": "abc"})).unwrap()
    }

    #[tokio::test]
    async fn test_broadcast_survives_failing_session() {
        let hub = LiveHub::new();
        let (_a, mut rx_a) = hub.connect();
        hub.attach(Arc::new(BrokenSink));
        let (_c, mut rx_c) = hub.connect();

        let report = hub.broadcast(&event());
        assert_eq!(report.delivered, 2);
        assert_eq!(report.dropped, 1);
        assert_eq!(hub.session_count(), 2);

        let frame: serde_json::Value = serde_json::from_str(&rx_a.recv().await.unwrap()).unwrap();
        assert_eq!(frame["type"], "NEW_INCIDENT");
        assert_eq!(frame["data"]["id"], "abc");
        assert!(rx_c.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_removed() {
        let hub = LiveHub::new();
        let (_id, rx) = hub.connect();
        drop(rx);
        let report = hub.broadcast(&event());
        assert_eq!(report.dropped, 1);
        assert_eq!(hub.session_count(), 0);
    }

    #[tokio::test]
    async fn test_no_replay_for_late_sessions() {
        let hub = LiveHub::new();
        hub.broadcast(&event());
        let (_id, mut rx) = hub.connect();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_full_session_skipped_not_dropped() {
        let hub = LiveHub::new();
        let (_id, _rx) = hub.connect();
        for _ in 0..SESSION_BUFFER {
            hub.broadcast(&event());
        }
        let report = hub.broadcast(&event());
        assert_eq!(report.skipped, 1);
        assert_eq!(hub.session_count(), 1);
    }

    #[test]
    fn test_disconnect() {
        let hub = LiveHub::new();
        let (id, _rx) = hub.connect();
        hub.disconnect(&id);
        hub.disconnect(&id);
        assert_eq!(hub.session_count(), 0);
    }
}
