//! HTTP adapter for the vector database's REST gateway.
//!
//! One http1 handshake per request, every round trip wrapped in an
//! explicit timeout so a hung server cannot wedge the runtime. The
//! gateway surface the adapter relies on:
//!
//! - `GET /healthz` — 2xx when the server session is usable.
//! - `GET /collections` — JSON array of collection metadata.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use http_body_util::BodyExt;
use tracing::debug;

use crate::client::{ClientConnector, VectorClient};
use crate::error::{ClientError, ClientResult};
use crate::types::{CollectionSummary, Credentials};

/// Default per-request timeout for probe and list calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Adapter version reported through `GET /version`.
const SDK_VERSION: &str = concat!("vecdeck-http/", env!("CARGO_PKG_VERSION"));

/// Connector producing [`HttpVectorClient`] sessions.
pub struct HttpConnector {
    timeout: Duration,
}

impl HttpConnector {
    pub fn new() -> Self {
        Self {
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClientConnector for HttpConnector {
    async fn connect(
        &self,
        address: &str,
        credentials: &Credentials,
    ) -> ClientResult<Arc<dyn VectorClient>> {
        // The adapter speaks plain http1; an encrypted channel needs a
        // TLS-capable SDK build.
        if credentials.tls {
            return Err(ClientError::Connect(
                "tls is not supported by the http adapter".to_string(),
            ));
        }

        let auth_header = credentials.username.as_ref().map(|user| {
            let pass = credentials.password.as_deref().unwrap_or("");
            let token =
                base64::engine::general_purpose::STANDARD.encode(format!("{user}:{pass}"));
            format!("Basic {token}")
        });

        Ok(Arc::new(HttpVectorClient {
            address: address.to_string(),
            auth_header,
            timeout: self.timeout,
            closed: AtomicBool::new(false),
        }))
    }

    fn sdk_version(&self) -> &'static str {
        SDK_VERSION
    }
}

/// A session against one server, addressed as host:port.
pub struct HttpVectorClient {
    address: String,
    auth_header: Option<String>,
    timeout: Duration,
    closed: AtomicBool,
}

impl HttpVectorClient {
    fn ensure_open(&self) -> ClientResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ClientError::Request("client is closed".to_string()));
        }
        Ok(())
    }

    /// One GET round trip against the gateway.
    async fn get(&self, path: &str) -> ClientResult<(http::StatusCode, bytes::Bytes)> {
        let address = self.address.clone();
        let uri = format!("http://{address}{path}");

        let result = tokio::time::timeout(self.timeout, async {
            let stream = tokio::net::TcpStream::connect(&address)
                .await
                .map_err(|e| ClientError::Request(format!("connect {address}: {e}")))?;

            let io = hyper_util::rt::TokioIo::new(stream);
            let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
                .await
                .map_err(|e| ClientError::Request(format!("handshake {address}: {e}")))?;

            // Drive the connection in the background.
            tokio::spawn(async move {
                let _ = conn.await;
            });

            let mut builder = http::Request::builder()
                .method("GET")
                .uri(&uri)
                .header("host", address.as_str())
                .header("user-agent", SDK_VERSION);
            if let Some(ref auth) = self.auth_header {
                builder = builder.header("authorization", auth.clone());
            }
            let req = builder
                .body(http_body_util::Empty::<bytes::Bytes>::new())
                .map_err(|e| ClientError::Request(e.to_string()))?;

            let resp = sender
                .send_request(req)
                .await
                .map_err(|e| ClientError::Request(format!("request {uri}: {e}")))?;

            let status = resp.status();
            let body = resp
                .into_body()
                .collect()
                .await
                .map_err(|e| ClientError::Request(format!("body {uri}: {e}")))?
                .to_bytes();

            Ok((status, body))
        })
        .await;

        match result {
            Ok(inner) => inner,
            Err(_) => {
                debug!(%uri, "request timed out");
                Err(ClientError::Request(format!("timeout after {:?}", self.timeout)))
            }
        }
    }
}

#[async_trait]
impl VectorClient for HttpVectorClient {
    async fn check_health(&self) -> ClientResult<bool> {
        self.ensure_open()?;
        match self.get("/healthz").await {
            Ok((status, _)) => Ok(status.is_success()),
            Err(e) => Err(ClientError::Probe(e.to_string())),
        }
    }

    async fn list_collections(&self) -> ClientResult<Vec<CollectionSummary>> {
        self.ensure_open()?;
        let (status, body) = self.get("/collections").await?;
        if !status.is_success() {
            return Err(ClientError::Request(format!(
                "list collections returned {status}"
            )));
        }
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn close(&self) -> ClientResult<()> {
        // No held connection to tear down — the flag fences later calls.
        self.closed.store(true, Ordering::SeqCst);
        debug!(address = %self.address, "client closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connector_rejects_tls() {
        let connector = HttpConnector::new();
        let creds = Credentials {
            tls: true,
            ..Default::default()
        };
        let err = connector.connect("127.0.0.1:19530", &creds).await;
        assert!(matches!(err, Err(ClientError::Connect(_))));
    }

    #[tokio::test]
    async fn closed_client_refuses_calls() {
        let connector = HttpConnector::new();
        let client = connector
            .connect("127.0.0.1:19530", &Credentials::default())
            .await
            .unwrap();
        client.close().await.unwrap();
        assert!(matches!(
            client.check_health().await,
            Err(ClientError::Request(_))
        ));
        assert!(matches!(
            client.list_collections().await,
            Err(ClientError::Request(_))
        ));
    }

    #[tokio::test]
    async fn probe_against_closed_port_errors() {
        let connector = HttpConnector::with_timeout(Duration::from_millis(200));
        // Port 1 is never listening.
        let client = connector
            .connect("127.0.0.1:1", &Credentials::default())
            .await
            .unwrap();
        assert!(client.check_health().await.is_err());
    }

    #[test]
    fn sdk_version_names_the_adapter() {
        let connector = HttpConnector::new();
        assert!(connector.sdk_version().starts_with("vecdeck-http/"));
    }
}
