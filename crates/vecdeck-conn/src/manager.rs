//! Connection manager — connect / health-check / disconnect orchestration.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{info, warn};

use vecdeck_client::{ClientConnector, Credentials, VectorClient};

use crate::address::normalize;
use crate::cache::ConnectionCache;
use crate::error::{ConnError, ConnResult};

/// Orchestrates the connection lifecycle and holds the active-connection
/// pointer.
///
/// "Active" is an instance field, not process-global state: the daemon
/// builds one manager and hands `Arc<ConnectionManager>` to the API and
/// poller layers.
pub struct ConnectionManager {
    cache: ConnectionCache,
    connector: Arc<dyn ClientConnector>,
    /// Normalized address of the connection ambient operations target.
    active: RwLock<Option<String>>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn ClientConnector>, ttl: Duration) -> Self {
        Self {
            cache: ConnectionCache::new(ttl),
            connector,
            active: RwLock::new(None),
        }
    }

    /// Connect to `address`: normalize, construct a client, verify the
    /// health probe, cache the handle, mark it active.
    ///
    /// Returns the original (non-normalized) address for display. An
    /// unhealthy or failing probe closes the already-constructed client
    /// and leaves no cache entry.
    pub async fn connect(&self, address: &str, credentials: &Credentials) -> ConnResult<String> {
        let key = normalize(address);

        let client = self
            .connector
            .connect(&key, credentials)
            .await
            .map_err(|e| ConnError::ConnectFailed(e.to_string()))?;

        match client.check_health().await {
            Ok(true) => {}
            Ok(false) => {
                discard(&client, &key).await;
                return Err(ConnError::ConnectFailed(
                    "server reported unhealthy".to_string(),
                ));
            }
            Err(e) => {
                discard(&client, &key).await;
                return Err(ConnError::ConnectFailed(e.to_string()));
            }
        }

        self.cache.set(&key, address, client).await;
        *self.active.write().await = Some(key.clone());
        info!(address = %key, "connected");
        Ok(address.to_string())
    }

    /// Whether a live cached connection exists for `address`.
    ///
    /// Absence is a normal outcome, not an error. Does not reset the
    /// entry's expiry window.
    pub async fn check_connection(&self, address: &str) -> bool {
        self.cache.has(&normalize(address)).await
    }

    /// The client of the active connection.
    ///
    /// Fails `NotConnected` when no active address is set or the cache
    /// no longer holds a live entry for it — callers re-connect, nothing
    /// auto-reconnects here.
    pub async fn get_active_client(&self) -> ConnResult<Arc<dyn VectorClient>> {
        let active = self.active.read().await.clone();
        match active {
            Some(key) => self.client_for_scope(&key).await,
            None => Err(ConnError::NotConnected),
        }
    }

    /// Scope-threaded client lookup used by pollers: only resolves while
    /// `scope` is the active connection and still cached.
    pub async fn client_for_scope(&self, scope: &str) -> ConnResult<Arc<dyn VectorClient>> {
        {
            let active = self.active.read().await;
            if active.as_deref() != Some(scope) {
                return Err(ConnError::NotConnected);
            }
        }
        self.cache.get(scope).await.ok_or(ConnError::NotConnected)
    }

    /// Normalized address of the active connection, if any.
    pub async fn active_address(&self) -> Option<String> {
        self.active.read().await.clone()
    }

    /// Close the active client's session best-effort and clear the
    /// active pointer.
    ///
    /// The cache entry is deliberately left in place — disconnect and
    /// cache eviction are distinct operations.
    pub async fn disconnect(&self) {
        let Some(key) = self.active.write().await.take() else {
            warn!("disconnect with no active connection");
            return;
        };

        if let Some(client) = self.cache.get(&key).await {
            if let Err(e) = client.close().await {
                warn!(address = %key, error = %e, "close failed on disconnect");
            }
        }
        info!(address = %key, "disconnected");
    }

    /// The cache, for sweeper wiring and tests.
    pub fn cache(&self) -> &ConnectionCache {
        &self.cache
    }
}

/// Close a client that never made it into the cache.
async fn discard(client: &Arc<dyn VectorClient>, key: &str) {
    if let Err(e) = client.close().await {
        warn!(address = %key, error = %e, "failed to discard client");
    }
}
