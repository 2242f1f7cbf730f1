use axum::Json;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::fetch::FetchError;

pub(crate) const FAILURE_MESSAGE: &str = "Sorry, could not fetch and convert that URL";
pub(crate) const BLOCKED_MESSAGE: &str =
    "This website blocks automated access. Try a different URL.";

/// Failures surfaced to API clients.
///
/// GET failures answer in `text/plain`, POST failures as JSON
/// `{ "error", "details"? }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Please specify a valid url query parameter")]
    InvalidQueryUrl,

    #[error("Please specify a valid URL")]
    InvalidBodyUrl,

    #[error("Please provide either a URL or HTML content")]
    MissingInput,

    #[error("Could not parse that document")]
    Unparseable { details: String },

    #[error("{}", fetch_failure_message(.error, .plain))]
    Fetch {
        #[source]
        error: FetchError,
        /// Answer in `text/plain` instead of JSON
        plain: bool,
    },
}

impl ApiError {
    #[must_use]
    pub fn fetch_plain(error: FetchError) -> Self {
        Self::Fetch { error, plain: true }
    }

    #[must_use]
    pub fn fetch_json(error: FetchError) -> Self {
        Self::Fetch { error, plain: false }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidQueryUrl
            | Self::InvalidBodyUrl
            | Self::MissingInput
            | Self::Unparseable { .. } => StatusCode::BAD_REQUEST,
            Self::Fetch { error, .. } => fetch_status(error),
        }
    }
}

/// 502 when upstream answered badly, 504 when it never answered.
fn fetch_status(error: &FetchError) -> StatusCode {
    match error {
        FetchError::Http { .. } | FetchError::TooLarge { .. } => StatusCode::BAD_GATEWAY,
        FetchError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
        FetchError::Timeout(_) | FetchError::Transport(_) => StatusCode::GATEWAY_TIMEOUT,
    }
}

fn fetch_failure_message(error: &FetchError, plain: &bool) -> String {
    match error.upstream_status() {
        Some(403) => BLOCKED_MESSAGE.to_string(),
        // The plain-text form carries the status inline; JSON carries it in `details`.
        Some(status) if *plain => {
            format!("{FAILURE_MESSAGE} as the website returned HTTP {status}")
        }
        _ => FAILURE_MESSAGE.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Fetch { error, .. } => {
                tracing::warn!(status = status.as_u16(), "Upstream fetch failed: {error}");
            }
            other => tracing::debug!(status = status.as_u16(), "Rejected request: {other}"),
        }

        match self {
            Self::InvalidQueryUrl => plain_response(status, self.to_string()),
            Self::Fetch { plain: true, .. } => plain_response(status, self.to_string()),
            Self::Fetch {
                ref error,
                plain: false,
            } => {
                let payload = json!({ "error": self.to_string(), "details": error.to_string() });
                (status, Json(payload)).into_response()
            }
            Self::Unparseable { ref details } => {
                let payload = json!({ "error": self.to_string(), "details": details });
                (status, Json(payload)).into_response()
            }
            Self::InvalidBodyUrl | Self::MissingInput => {
                (status, Json(json!({ "error": self.to_string() }))).into_response()
            }
        }
    }
}

fn plain_response(status: StatusCode, message: String) -> Response {
    (status, [(CONTENT_TYPE, "text/plain")], message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fetch_statuses() {
        assert_eq!(
            ApiError::fetch_plain(FetchError::Http { status: 404 }).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::fetch_json(FetchError::Timeout(Duration::from_secs(15))).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::fetch_json(FetchError::TooLarge { limit: 10 }).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_fetch_messages() {
        assert_eq!(
            ApiError::fetch_plain(FetchError::Http { status: 403 }).to_string(),
            BLOCKED_MESSAGE
        );
        assert_eq!(
            ApiError::fetch_plain(FetchError::Http { status: 500 }).to_string(),
            "Sorry, could not fetch and convert that URL as the website returned HTTP 500"
        );
        assert_eq!(
            ApiError::fetch_json(FetchError::Http { status: 500 }).to_string(),
            FAILURE_MESSAGE
        );
        assert_eq!(
            ApiError::fetch_plain(FetchError::Timeout(Duration::from_secs(1))).to_string(),
            FAILURE_MESSAGE
        );
    }

    #[test]
    fn test_request_errors_are_bad_request() {
        for err in [
            ApiError::InvalidQueryUrl,
            ApiError::InvalidBodyUrl,
            ApiError::MissingInput,
            ApiError::Unparseable {
                details: "expected value".to_string(),
            },
        ] {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }
}
