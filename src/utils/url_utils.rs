//! URL helpers shared by the converter and the HTTP layer.

use url::Url;

/// Host and origin of a source URL, as needed by site filters and link
/// absolutization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Lowercase hostname without port, e.g. `en.wikipedia.org`
    pub hostname: String,
    /// Scheme, host and (non-default) port, e.g. `https://example.com:8443`
    pub origin: String,
}

/// Check if a URL is valid for fetching
///
/// Only absolute `http` and `https` URLs qualify.
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Parse a source URL into its hostname and origin.
///
/// Returns `None` for empty input, unparseable URLs and URLs without a host
/// (`data:`, `mailto:` and friends).
#[must_use]
pub fn parse_source_url(url: &str) -> Option<SourceLocation> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = match Url::parse(trimmed) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!("Ignoring unparseable source URL '{trimmed}': {e}");
            return None;
        }
    };

    let hostname = parsed.host_str()?.to_ascii_lowercase();
    let origin = parsed.origin().ascii_serialization();

    Some(SourceLocation { hostname, origin })
}
