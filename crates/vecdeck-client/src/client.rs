//! The SDK client traits.
//!
//! Clients are held as `Arc<dyn VectorClient>` — the connection cache
//! owns the canonical handle, operations clone the `Arc` for the
//! duration of a call.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::types::{CollectionSummary, Credentials};

/// A live session against one vector database server.
#[async_trait]
pub trait VectorClient: Send + Sync {
    /// Probe whether the underlying server session is usable.
    async fn check_health(&self) -> ClientResult<bool>;

    /// List collection metadata from the server.
    async fn list_collections(&self) -> ClientResult<Vec<CollectionSummary>>;

    /// Release the underlying session. Calls after `close` fail.
    async fn close(&self) -> ClientResult<()>;
}

/// Constructs clients for an address plus credentials.
#[async_trait]
pub trait ClientConnector: Send + Sync {
    /// Build a client for `address` (already normalized to host:port).
    ///
    /// Construction alone does not imply the server is usable — callers
    /// run [`VectorClient::check_health`] before trusting the handle.
    async fn connect(
        &self,
        address: &str,
        credentials: &Credentials,
    ) -> ClientResult<Arc<dyn VectorClient>>;

    /// Version string of the SDK/adapter behind this connector.
    fn sdk_version(&self) -> &'static str;
}
