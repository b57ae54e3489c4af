//! Websocket event channel.
//!
//! One-directional: the server pushes serialized [`Event`] frames,
//! client frames are ignored apart from close. At-most-once delivery —
//! a lagged session skips what it missed and keeps receiving.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use vecdeck_events::Event;

use crate::ApiState;

/// GET /events — upgrade and start relaying.
pub async fn events(
    State(state): State<ApiState>,
    upgrade: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = state.bridge.subscribe();
    upgrade.on_upgrade(move |socket| relay(socket, rx))
}

/// Pump bridge events into one session until either side goes away.
async fn relay(mut socket: WebSocket, mut rx: broadcast::Receiver<Event>) {
    debug!("ui session subscribed");
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    let Ok(text) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "ui session lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {} // one-directional channel, inbound frames ignored
                Some(Err(e)) => {
                    debug!(error = %e, "ui session receive error");
                    break;
                }
            },
        }
    }
    debug!("ui session closed");
}
