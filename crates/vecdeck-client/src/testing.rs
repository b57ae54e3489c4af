//! Scriptable mock client/connector shared by tests across the workspace.
//!
//! Enabled for dependents via the `testing` feature.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::client::{ClientConnector, VectorClient};
use crate::error::{ClientError, ClientResult};
use crate::types::{CollectionSummary, Credentials, LoadState};

/// A collection summary fixture.
pub fn sample_collection(name: &str, row_count: u64) -> CollectionSummary {
    CollectionSummary {
        name: name.to_string(),
        row_count,
        load_state: LoadState::Loaded,
    }
}

/// In-memory client whose behavior is scripted by tests.
pub struct MockClient {
    healthy: AtomicBool,
    fail_list: AtomicBool,
    close_calls: AtomicUsize,
    list_calls: AtomicUsize,
    collections: Mutex<Vec<CollectionSummary>>,
}

impl MockClient {
    pub fn healthy() -> Arc<Self> {
        Arc::new(Self {
            healthy: AtomicBool::new(true),
            fail_list: AtomicBool::new(false),
            close_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            collections: Mutex::new(vec![sample_collection("embeddings", 1200)]),
        })
    }

    pub fn unhealthy() -> Arc<Self> {
        let client = Self::healthy();
        client.healthy.store(false, Ordering::SeqCst);
        client
    }

    /// Make subsequent `list_collections` calls fail.
    pub fn fail_lists(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    /// Undo [`MockClient::fail_lists`].
    pub fn restore_lists(&self) {
        self.fail_list.store(false, Ordering::SeqCst);
    }

    pub async fn set_collections(&self, collections: Vec<CollectionSummary>) {
        *self.collections.lock().await = collections;
    }

    /// How many times `close` was called.
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// How many times `list_collections` was called.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorClient for MockClient {
    async fn check_health(&self) -> ClientResult<bool> {
        Ok(self.healthy.load(Ordering::SeqCst))
    }

    async fn list_collections(&self) -> ClientResult<Vec<CollectionSummary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ClientError::Request("scripted list failure".to_string()));
        }
        Ok(self.collections.lock().await.clone())
    }

    async fn close(&self) -> ClientResult<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Connector handing out [`MockClient`]s and recording what it built.
pub struct MockConnector {
    healthy: bool,
    fail_with: Option<String>,
    created: Mutex<Vec<Arc<MockClient>>>,
}

impl MockConnector {
    /// Every constructed client reports healthy.
    pub fn healthy() -> Arc<Self> {
        Arc::new(Self {
            healthy: true,
            fail_with: None,
            created: Mutex::new(Vec::new()),
        })
    }

    /// Every constructed client reports unhealthy on probe.
    pub fn unhealthy() -> Arc<Self> {
        Arc::new(Self {
            healthy: false,
            fail_with: None,
            created: Mutex::new(Vec::new()),
        })
    }

    /// Construction itself fails with `reason`.
    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            healthy: true,
            fail_with: Some(reason.to_string()),
            created: Mutex::new(Vec::new()),
        })
    }

    /// Clients constructed so far, in order.
    pub async fn created(&self) -> Vec<Arc<MockClient>> {
        self.created.lock().await.clone()
    }
}

#[async_trait]
impl ClientConnector for MockConnector {
    async fn connect(
        &self,
        _address: &str,
        _credentials: &Credentials,
    ) -> ClientResult<Arc<dyn VectorClient>> {
        if let Some(ref reason) = self.fail_with {
            return Err(ClientError::Connect(reason.clone()));
        }
        let client = if self.healthy {
            MockClient::healthy()
        } else {
            MockClient::unhealthy()
        };
        self.created.lock().await.push(client.clone());
        Ok(client)
    }

    fn sdk_version(&self) -> &'static str {
        "vecdeck-mock/0.0.0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_client_scripts_list_failure() {
        let client = MockClient::healthy();
        assert_eq!(client.list_collections().await.unwrap().len(), 1);
        client.fail_lists();
        assert!(client.list_collections().await.is_err());
        assert_eq!(client.list_calls(), 2);
    }

    #[tokio::test]
    async fn mock_connector_records_created_clients() {
        let connector = MockConnector::healthy();
        connector
            .connect("127.0.0.1:19530", &Credentials::default())
            .await
            .unwrap();
        assert_eq!(connector.created().await.len(), 1);
    }

    #[tokio::test]
    async fn failing_connector_never_constructs() {
        let connector = MockConnector::failing("auth rejected");
        let err = connector
            .connect("127.0.0.1:19530", &Credentials::default())
            .await;
        assert!(matches!(err, Err(ClientError::Connect(_))));
        assert!(connector.created().await.is_empty());
    }
}
