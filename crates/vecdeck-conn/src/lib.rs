//! vecdeck-conn — connection lifecycle for the console.
//!
//! Three layers, leaf-first:
//!
//! - [`address::normalize`] — canonical `host:port` cache keys.
//! - [`ConnectionCache`] — normalized address → live client, sliding TTL,
//!   lazy expiry on read plus an optional background sweeper.
//! - [`ConnectionManager`] — connect / health-check / disconnect
//!   orchestration and the active-connection pointer.

pub mod address;
pub mod cache;
pub mod error;
pub mod manager;

pub use address::{DEFAULT_DB_PORT, normalize};
pub use cache::{ConnectionCache, DEFAULT_CONNECTION_TTL};
pub use error::{ConnError, ConnResult};
pub use manager::ConnectionManager;
