//! Connection cache — normalized address → live client, sliding TTL.
//!
//! Expiry is enforced lazily: `get`/`has` observe "not present" for an
//! expired entry regardless of whether the background sweeper ever ran.
//! The sweeper only reclaims resources earlier. Reads that hit reset
//! the entry's window, so a connection under active polling never
//! expires mid-session while idle ones are reclaimed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use vecdeck_client::VectorClient;

/// Default sliding TTL for cached connections.
pub const DEFAULT_CONNECTION_TTL: Duration = Duration::from_secs(86_400);

struct CacheEntry {
    /// The user-supplied address, pre-normalization, kept for display.
    display_address: String,
    client: Arc<dyn VectorClient>,
    last_accessed: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_accessed.elapsed() > ttl
    }

    fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }
}

/// Keyed store of live clients with independent sliding expiry windows.
///
/// All mutation goes through one whole-map lock — call frequency is low
/// and coarse locking keeps the replace-closes-prior invariant simple.
pub struct ConnectionCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ConnectionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch the client for `key`, resetting its expiry window on hit.
    ///
    /// An expired entry reads as absent; it is removed and its client
    /// closed on the way out.
    pub async fn get(&self, key: &str) -> Option<Arc<dyn VectorClient>> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) => {
                if !entry.is_expired(self.ttl) {
                    entry.touch();
                    return Some(entry.client.clone());
                }
            }
            None => return None,
        }

        let removed = entries.remove(key);
        drop(entries);
        if let Some(entry) = removed {
            debug!(%key, "expired connection evicted on read");
            close_client(&entry.client, key).await;
        }
        None
    }

    /// Existence check that does NOT reset the expiry window.
    pub async fn has(&self, key: &str) -> bool {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(self.ttl))
    }

    /// Insert or replace. A replaced client is closed, never silently
    /// dropped — the session may hold network resources.
    pub async fn set(
        &self,
        key: &str,
        display_address: &str,
        client: Arc<dyn VectorClient>,
    ) {
        let prior = {
            let mut entries = self.entries.write().await;
            entries.insert(
                key.to_string(),
                CacheEntry {
                    display_address: display_address.to_string(),
                    client,
                    last_accessed: Instant::now(),
                },
            )
        };

        if let Some(entry) = prior {
            debug!(%key, "replacing cached connection, closing prior client");
            close_client(&entry.client, key).await;
        }
    }

    /// Explicit removal; closes the client if present.
    pub async fn delete(&self, key: &str) {
        let removed = self.entries.write().await.remove(key);
        if let Some(entry) = removed {
            close_client(&entry.client, key).await;
        }
    }

    /// Display address recorded for `key`, if cached and live.
    pub async fn display_address(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(self.ttl))
            .map(|entry| entry.display_address.clone())
    }

    /// Close and remove every expired entry. Returns how many were
    /// reclaimed.
    pub async fn sweep(&self) -> usize {
        let expired = {
            let mut entries = self.entries.write().await;
            let keys: Vec<String> = entries
                .iter()
                .filter(|(_, entry)| entry.is_expired(self.ttl))
                .map(|(key, _)| key.clone())
                .collect();
            keys.into_iter()
                .filter_map(|key| entries.remove(&key).map(|entry| (key, entry)))
                .collect::<Vec<_>>()
        };

        let count = expired.len();
        for (key, entry) in expired {
            debug!(key = %key, "sweeper evicting expired connection");
            close_client(&entry.client, &key).await;
        }
        count
    }

    /// Background eviction loop. Correctness never depends on this
    /// running — reads enforce expiry on their own.
    pub async fn run_sweeper(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    let reclaimed = self.sweep().await;
                    if reclaimed > 0 {
                        info!(reclaimed, "connection sweep");
                    }
                }
                _ = shutdown.changed() => {
                    debug!("connection sweeper shutting down");
                    break;
                }
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Best-effort close; failures are logged, not propagated.
async fn close_client(client: &Arc<dyn VectorClient>, key: &str) {
    if let Err(e) = client.close().await {
        warn!(%key, error = %e, "failed to close client");
    }
}
