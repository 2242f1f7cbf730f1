//! Loading `ServiceConfig` from environment variables

use std::time::Duration;

use super::builder::ServiceConfigBuilder;
use super::types::{ConfigError, ServiceConfig};

pub const ENV_BIND: &str = "URL_TO_MARKDOWN_BIND";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "URL_TO_MARKDOWN_FETCH_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "URL_TO_MARKDOWN_USER_AGENT";
pub const ENV_MAX_BODY_BYTES: &str = "URL_TO_MARKDOWN_MAX_BODY_BYTES";

fn parse_number<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|source| ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
            source,
        })
}

impl ServiceConfig {
    /// Load from the process environment; unset variables keep defaults.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from parsing or validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using `lookup` in place of the environment.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from parsing or validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = ServiceConfigBuilder::default();

        if let Some(bind) = lookup(ENV_BIND) {
            builder = builder.bind_addr(bind);
        }
        if let Some(secs) = lookup(ENV_FETCH_TIMEOUT_SECS) {
            let secs = parse_number::<u64>(ENV_FETCH_TIMEOUT_SECS, &secs)?;
            builder = builder.fetch_timeout(Duration::from_secs(secs));
        }
        if let Some(user_agent) = lookup(ENV_USER_AGENT) {
            builder = builder.user_agent(user_agent);
        }
        if let Some(bytes) = lookup(ENV_MAX_BODY_BYTES) {
            builder = builder.max_body_bytes(parse_number::<usize>(ENV_MAX_BODY_BYTES, &bytes)?);
        }

        builder.build()
    }
}
