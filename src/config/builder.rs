//! Validating builder for `ServiceConfig`

use reqwest::header::HeaderValue;
use std::net::SocketAddr;
use std::time::Duration;

use super::types::{ConfigError, ServiceConfig};
use crate::utils::constants::{
    BROWSER_USER_AGENT, DEFAULT_BIND_ADDR, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_BODY_BYTES,
};

/// Builder for [`ServiceConfig`]; every field has a default.
#[derive(Debug, Clone)]
pub struct ServiceConfigBuilder {
    pub(crate) bind_addr: String,
    pub(crate) fetch_timeout: Duration,
    pub(crate) user_agent: String,
    pub(crate) max_body_bytes: usize,
}

impl Default for ServiceConfigBuilder {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: BROWSER_USER_AGENT.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServiceConfig {
    /// Create a builder preloaded with defaults
    ///
    /// ```rust
    /// # use url_to_markdown::config::ServiceConfig;
    /// # use std::time::Duration;
    /// let config = ServiceConfig::builder()
    ///     .bind_addr("0.0.0.0:9000")
    ///     .fetch_timeout(Duration::from_secs(5))
    ///     .build()?;
    /// assert_eq!(config.bind_addr().port(), 9000);
    /// # Ok::<(), url_to_markdown::config::ConfigError>(())
    /// ```
    #[must_use]
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServiceConfigBuilder {
    #[must_use]
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Whole seconds are kept; sub-second remainders are dropped.
    #[must_use]
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidBindAddr`] if the address does not parse
    /// - [`ConfigError::InvalidField`] for a zero timeout or body limit, or a
    ///   user agent that is empty or not a valid header value
    pub fn build(self) -> Result<ServiceConfig, ConfigError> {
        let bind_addr = self
            .bind_addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: self.bind_addr.clone(),
                source,
            })?;

        let fetch_timeout_secs = self.fetch_timeout.as_secs();
        if fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidField {
                field: "fetch_timeout",
                reason: "must be at least one second".to_string(),
            });
        }

        if self.max_body_bytes == 0 {
            return Err(ConfigError::InvalidField {
                field: "max_body_bytes",
                reason: "must be greater than zero".to_string(),
            });
        }

        let user_agent = self.user_agent.trim().to_string();
        if user_agent.is_empty() || HeaderValue::from_str(&user_agent).is_err() {
            return Err(ConfigError::InvalidField {
                field: "user_agent",
                reason: format!("'{}' is not a usable header value", self.user_agent),
            });
        }

        Ok(ServiceConfig {
            bind_addr,
            fetch_timeout_secs,
            user_agent,
            max_body_bytes: self.max_body_bytes,
        })
    }
}
