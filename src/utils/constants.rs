//! Shared configuration constants for url_to_markdown
//!
//! Default values used by the fetcher, the HTTP service and the converter,
//! kept in one place to avoid magic numbers scattered through the codebase.

use std::time::Duration;

/// Default fetch timeout: 15 seconds
///
/// The in-flight request is aborted once this elapses and a timeout error is
/// surfaced to the caller. No retry is attempted.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Desktop Chrome user agent sent with every fetch
///
/// Several publishing platforms serve a degraded page (or a 403) to clients
/// that do not look like a browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// `Accept` header sent with every fetch
pub const HTML_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// `Accept-Language` header sent with every fetch
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Default bind address for the HTTP service
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

/// Maximum accepted POST body: 10 MB
///
/// Matches the HTML size ceiling enforced by main-content extraction.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Tables whose summed column width reaches this value are rendered as
/// nested lists instead of pipe tables.
pub const MAX_TABLE_WIDTH: usize = 96;

/// Minimum rendered width of a table column
pub const MIN_COLUMN_WIDTH: usize = 3;
