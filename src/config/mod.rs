//! Service configuration: bind address, fetch limits and user agent.
//!
//! Built with [`ServiceConfig::builder`] or loaded with
//! [`ServiceConfig::from_env`].

pub mod builder;
pub mod env;
pub mod getters;
pub mod types;

pub use builder::ServiceConfigBuilder;
pub use types::{ConfigError, ServiceConfig};
