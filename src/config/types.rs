//! Service configuration types

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;

/// Runtime configuration of the HTTP service and its fetcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Address the HTTP API listens on
    pub(crate) bind_addr: SocketAddr,

    /// Upper bound for one upstream fetch, connect through last body byte.
    ///
    /// Default: 15 seconds
    pub(crate) fetch_timeout_secs: u64,

    /// `User-Agent` sent upstream
    pub(crate) user_agent: String,

    /// Upstream bodies and POSTed documents larger than this are rejected
    pub(crate) max_body_bytes: usize,
}

/// Errors raised while building or loading a [`ServiceConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Bind address is not `host:port`
    #[error("Invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// Environment variable is not a valid number
    #[error("Invalid value '{value}' for {var}: {source}")]
    InvalidNumber {
        var: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Field value out of range
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}
