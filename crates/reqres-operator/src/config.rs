//! Operator configuration resolved once from the environment at startup

use std::time::Duration;

use thiserror::Error;

use reqres_client::ClientConfig;
use reqres_common::DEFAULT_REMOTE_BASE_URL;
use reqres_controller::ReconcilerConfig;

/// Base URL of the remote users API
pub const ENV_ROOT_URL: &str = "REQRES_ROOT_URL";
/// Per-request HTTP timeout in seconds
pub const ENV_HTTP_TIMEOUT_SECS: &str = "REQRES_HTTP_TIMEOUT_SECS";
/// Delay before retrying a failed remote call, in seconds
pub const ENV_RETRY_DELAY_SECS: &str = "REQRES_RETRY_DELAY_SECS";
/// Interval between re-checks of converged users, in seconds
pub const ENV_RESYNC_SECS: &str = "REQRES_RESYNC_SECS";
/// Whether to install the User CRD on startup
pub const ENV_INSTALL_CRDS: &str = "REQRES_INSTALL_CRDS";

/// Invalid configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A duration variable was not a positive whole number of seconds
    #[error("{name} must be a positive number of seconds, got {value:?}")]
    InvalidSeconds {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },

    /// A flag variable was not a boolean
    #[error("{name} must be true or false, got {value:?}")]
    InvalidBool {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },

    /// The remote URL was set but blank
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Resolved operator configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorConfig {
    /// Base URL of the remote users API
    pub remote_base_url: String,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
    /// Delay requested after a failed remote call
    pub retry_delay: Duration,
    /// Requeue interval for converged users
    pub resync: Duration,
    /// Install the User CRD on startup
    pub install_crds: bool,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            remote_base_url: DEFAULT_REMOTE_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(10),
            retry_delay: Duration::from_secs(10),
            resync: Duration::from_secs(300),
            install_crds: true,
        }
    }
}

impl OperatorConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for unset variables
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let remote_base_url = match lookup(ENV_ROOT_URL) {
            Some(url) if url.trim().is_empty() => return Err(ConfigError::Empty(ENV_ROOT_URL)),
            Some(url) => url.trim().to_string(),
            None => defaults.remote_base_url,
        };

        Ok(Self {
            remote_base_url,
            http_timeout: seconds(&lookup, ENV_HTTP_TIMEOUT_SECS, defaults.http_timeout)?,
            retry_delay: seconds(&lookup, ENV_RETRY_DELAY_SECS, defaults.retry_delay)?,
            resync: seconds(&lookup, ENV_RESYNC_SECS, defaults.resync)?,
            install_crds: flag(&lookup, ENV_INSTALL_CRDS, defaults.install_crds)?,
        })
    }

    /// Settings for the remote client
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.remote_base_url.clone(),
            timeout: self.http_timeout,
        }
    }

    /// Timing for the reconciler
    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            retry_delay: self.retry_delay,
            ..ReconcilerConfig::default()
        }
    }
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(value) = lookup(name) else {
        return Ok(default);
    };
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidSeconds { name, value }),
    }
}

fn flag(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(value) = lookup(name) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool { name, value }),
    }
}
