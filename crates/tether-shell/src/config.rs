#![forbid(unsafe_code)]

//! Shell configuration.
//!
//! Defaults match the production client; a TOML file can override them.
//!
//! ```toml
//! endpoint = "/_s"
//! spin_delay_ms = 500
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tether_client::DEFAULT_ENDPOINT;

/// Debounce window before the busy spinner becomes opaque.
pub const DEFAULT_SPIN_DELAY_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid shell config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables for the app shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Socket endpoint the shell connects to on init.
    pub endpoint: String,
    /// Busy-overlay debounce window, in milliseconds.
    pub spin_delay_ms: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            spin_delay_ms: DEFAULT_SPIN_DELAY_MS,
        }
    }
}

impl ShellConfig {
    /// Parse a TOML document; absent keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// The debounce window as a [`Duration`].
    #[must_use]
    pub fn spin_delay(&self) -> Duration {
        Duration::from_millis(self.spin_delay_ms)
    }
}
