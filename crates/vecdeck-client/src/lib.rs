//! vecdeck-client — the seam between VecDeck and the vector database SDK.
//!
//! The console never speaks the database wire protocol itself. Everything
//! it needs from a server session is captured by two traits:
//!
//! - [`ClientConnector`] — constructs a live client for an address plus
//!   credentials.
//! - [`VectorClient`] — a live session: health probe, collection listing,
//!   session release.
//!
//! [`HttpConnector`] is the shipped adapter (hyper, one http1 round trip
//! per call). Tests across the workspace use the scriptable mocks in
//! [`testing`] instead of a real server.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{ClientConnector, VectorClient};
pub use error::{ClientError, ClientResult};
pub use http::HttpConnector;
pub use types::{CollectionSummary, Credentials, LoadState};
