//! vecdeck-events — typed event fan-out to UI sessions.
//!
//! Server-side subsystems emit [`Event`] values; every connected UI
//! session receives every event (broad fan-out, no per-session
//! addressing — a known limitation of the design, kept as-is).
//! Delivery is at-most-once: no ack, no replay. A session that
//! subscribes after an emission resynchronizes through its own next
//! request; a lagged subscriber skips what it missed and keeps going.
//!
//! The bus carries a closed sum type, not string-keyed payloads — adding
//! an event means adding a variant, and the compiler finds every relay.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use vecdeck_client::CollectionSummary;

/// Buffered events per subscriber before laggards start skipping.
const EVENT_BUFFER: usize = 64;

/// Everything the server pushes to UI sessions.
///
/// Wire shape: `{"event": "<NAME>", "data": <payload>}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum Event {
    /// Collection metadata changed (or was re-fetched by the poller).
    #[serde(rename = "COLLECTIONS_CHANGED")]
    CollectionsChanged(Vec<CollectionSummary>),
}

impl Event {
    /// The wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            Event::CollectionsChanged(_) => "COLLECTIONS_CHANGED",
        }
    }
}

/// One-directional relay from emitters to all subscribed sessions.
#[derive(Clone)]
pub struct EventBridge {
    tx: broadcast::Sender<Event>,
}

impl EventBridge {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_BUFFER);
        Self { tx }
    }

    /// Fire-and-forget emission. No subscribers is a normal state, not
    /// an error.
    pub fn emit(&self, event: Event) {
        debug!(event = event.name(), "emit");
        let _ = self.tx.send(event);
    }

    /// Subscribe to everything emitted from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn session_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vecdeck_client::testing::sample_collection;

    #[test]
    fn event_serializes_to_the_wire_shape() {
        let event = Event::CollectionsChanged(vec![sample_collection("embeddings", 42)]);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "COLLECTIONS_CHANGED");
        assert_eq!(json["data"][0]["name"], "embeddings");
        assert_eq!(json["data"][0]["row_count"], 42);
    }

    #[tokio::test]
    async fn every_subscriber_receives_every_event() {
        let bridge = EventBridge::new();
        let mut rx1 = bridge.subscribe();
        let mut rx2 = bridge.subscribe();

        bridge.emit(Event::CollectionsChanged(vec![]));

        assert_eq!(rx1.recv().await.unwrap(), Event::CollectionsChanged(vec![]));
        assert_eq!(rx2.recv().await.unwrap(), Event::CollectionsChanged(vec![]));
    }

    #[tokio::test]
    async fn emit_without_subscribers_is_fine() {
        let bridge = EventBridge::new();
        bridge.emit(Event::CollectionsChanged(vec![]));
        assert_eq!(bridge.session_count(), 0);
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_events() {
        let bridge = EventBridge::new();
        bridge.emit(Event::CollectionsChanged(vec![sample_collection("a", 1)]));

        let mut rx = bridge.subscribe();
        bridge.emit(Event::CollectionsChanged(vec![sample_collection("b", 2)]));

        // Only the post-subscription event arrives.
        let got = rx.recv().await.unwrap();
        let Event::CollectionsChanged(collections) = got;
        assert_eq!(collections[0].name, "b");
        assert!(rx.try_recv().is_err());
    }
}
