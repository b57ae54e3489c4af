//! Address normalization.
//!
//! The normalized form is the sole cache key, so two spellings a human
//! would consider "the same server" that normalize differently are
//! distinct connections (`localhost:19530` vs `127.0.0.1:19530`). That
//! is an accepted limitation, not something this function papers over.

/// Default port of the vector database server.
pub const DEFAULT_DB_PORT: &str = "19530";

/// Canonicalize a user-supplied endpoint to `host:port`.
///
/// Strips a leading literal `http://` or `https://` (no full URL
/// parsing) and appends the default port when none is present. Pure and
/// total: malformed input passes through best-effort. Idempotent.
pub fn normalize(address: &str) -> String {
    let trimmed = address.trim();
    let stripped = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .unwrap_or(trimmed);

    if stripped.contains(':') {
        stripped.to_string()
    } else {
        format!("{stripped}:{DEFAULT_DB_PORT}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_http_scheme() {
        assert_eq!(normalize("http://127.0.0.1:19530"), "127.0.0.1:19530");
    }

    #[test]
    fn strips_https_scheme() {
        assert_eq!(normalize("https://db.internal:19531"), "db.internal:19531");
    }

    #[test]
    fn appends_default_port() {
        assert_eq!(normalize("127.0.0.1"), "127.0.0.1:19530");
        assert_eq!(normalize("http://host"), "host:19530");
        assert_eq!(normalize("host"), "host:19530");
    }

    #[test]
    fn already_normalized_passes_through() {
        assert_eq!(normalize("127.0.0.1:19530"), "127.0.0.1:19530");
    }

    #[test]
    fn idempotent() {
        for input in ["http://host", "https://host:1", "host", "host:19530", ""] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn scheme_match_is_case_sensitive() {
        // Literal match only: an uppercase scheme is not stripped (and its
        // colon counts as a port separator — best-effort passthrough).
        assert_eq!(normalize("HTTP://host"), "HTTP://host");
    }

    #[test]
    fn malformed_input_passes_through() {
        assert_eq!(normalize(""), ":19530");
        assert_eq!(normalize("::"), "::");
    }
}
