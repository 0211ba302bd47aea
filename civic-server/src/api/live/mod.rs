//! Dashboard WebSocket endpoint
//!
//! GET /ws/incidents
//!
//! Protocol:
//! - Server → Dashboard: `{"type": "...", "data": {...}}` live events
//! - Dashboard → Server: ignored, except close frames
//!
//! A session only sees events broadcast after it connected.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::{Router, routing::get};
use futures::{SinkExt, StreamExt};
use tokio::time::Duration;

use crate::core::ServerState;

const PING_INTERVAL: Duration = Duration::from_secs(30);

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws/incidents", get(handle_live_ws))
}

async fn handle_live_ws(State(state): State<ServerState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| live_session(socket, state))
}

async fn live_session(socket: WebSocket, state: ServerState) {
    let (mut sink, mut stream) = socket.split();
    let (session_id, mut rx) = state.hub.connect();

    tracing::info!(session_id = %session_id, "Live session connected");

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            frame = rx.recv() => {
                match frame {
                    Some(text) => {
                        if sink.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    // hub dropped the session
                    None => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    state.hub.disconnect(&session_id);
    tracing::info!(session_id = %session_id, "Live session disconnected");
}
