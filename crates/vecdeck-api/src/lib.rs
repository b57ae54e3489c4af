//! vecdeck-api — the HTTP surface consumed by the console UI.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/version` | SDK and app version (no auth, always available) |
//! | POST | `/connect` | Connect to a server, mark it active |
//! | GET | `/check?address=` | Whether a live cached connection exists |
//! | POST | `/disconnect` | Close the active connection (best-effort) |
//! | PUT | `/crons` | Toggle the collection poll job |
//! | GET | `/events` | Websocket upgrade; server pushes event frames |
//!
//! Errors are always `{"message": string}` with a stable string — no
//! stack traces, no internal identifiers.

pub mod handlers;
pub mod ws;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};

use vecdeck_conn::ConnectionManager;
use vecdeck_events::EventBridge;
use vecdeck_poller::PollingService;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub manager: Arc<ConnectionManager>,
    pub poller: Arc<PollingService>,
    pub bridge: EventBridge,
    /// Version string of the SDK adapter, reported by `/version`.
    pub sdk_version: &'static str,
}

/// Build the complete console router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/version", get(handlers::version))
        .route("/connect", post(handlers::connect))
        .route("/check", get(handlers::check))
        .route("/disconnect", post(handlers::disconnect))
        .route("/crons", put(handlers::toggle_cron))
        .route("/events", get(ws::events))
        .with_state(state)
}
