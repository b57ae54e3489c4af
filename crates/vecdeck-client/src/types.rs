//! Domain types crossing the SDK seam.

use serde::{Deserialize, Serialize};

/// Credentials supplied with a connect request.
///
/// All fields optional: an open server needs none, a secured one takes
/// username/password, `tls` asks the adapter for an encrypted channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub tls: bool,
}

impl Credentials {
    /// Whether any authentication material is present.
    pub fn has_auth(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }
}

/// Load state of a collection as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Loaded,
    Loading,
    Unloaded,
    Unknown,
}

/// Collection metadata as produced by the server.
///
/// The polling core forwards these verbatim to UI sessions; nothing in
/// VecDeck interprets the statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionSummary {
    pub name: String,
    /// Row-count-like statistic reported by the server.
    pub row_count: u64,
    pub load_state: LoadState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_default_has_no_auth() {
        let creds = Credentials::default();
        assert!(!creds.has_auth());
        assert!(!creds.tls);
    }

    #[test]
    fn credentials_with_username_has_auth() {
        let creds = Credentials {
            username: Some("root".to_string()),
            ..Default::default()
        };
        assert!(creds.has_auth());
    }

    #[test]
    fn collection_summary_round_trips_json() {
        let summary = CollectionSummary {
            name: "embeddings".to_string(),
            row_count: 1200,
            load_state: LoadState::Loaded,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"load_state\":\"loaded\""));
        let back: CollectionSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }

    #[test]
    fn credentials_deserialize_without_tls_field() {
        let creds: Credentials =
            serde_json::from_str(r#"{"username":"root","password":"secret"}"#).unwrap();
        assert!(!creds.tls);
        assert_eq!(creds.username.as_deref(), Some("root"));
    }
}
