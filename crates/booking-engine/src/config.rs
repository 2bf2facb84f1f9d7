//! Client configuration.
//!
//! Loaded from a TOML file, then overridden from the environment:
//!
//! - `BOOKING_API_URL`: API root, e.g. `https://book.example.com/api`
//! - `BOOKING_API_TOKEN`: bearer token
//! - `BOOKING_TIMEZONE`: default IANA timezone
//!
//! A `.env` file in the working directory is loaded before the environment is
//! read.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::slots::DEFAULT_BUFFER_HOURS;
use crate::timezone::local_timezone;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "BOOKING_API_URL";
pub const ENV_API_TOKEN: &str = "BOOKING_API_TOKEN";
pub const ENV_TIMEZONE: &str = "BOOKING_TIMEZONE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub default_timezone: Option<String>,
    pub buffer_hours: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_timezone: None,
            buffer_hours: DEFAULT_BUFFER_HOURS,
        }
    }
}

impl ClientConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    /// Returns `ConfigError::Toml` if the document is invalid.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read a TOML config file.
    ///
    /// # Errors
    /// Returns `ConfigError::Io` if the file cannot be read, or
    /// `ConfigError::Toml` if it is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading client config");
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Load from an optional file, then apply `.env` and environment overrides.
    ///
    /// # Errors
    /// Same as [`Self::from_file`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Apply `BOOKING_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(err) => debug!(error = %err, "no .env loaded"),
        }
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = value(ENV_API_URL) {
            self.base_url = url;
        }
        if let Some(token) = value(ENV_API_TOKEN) {
            self.token = Some(token);
        }
        if let Some(timezone) = value(ENV_TIMEZONE) {
            self.default_timezone = Some(timezone);
        }
        self
    }

    /// The configured default timezone, else the process-local one.
    pub fn timezone(&self) -> String {
        self.default_timezone
            .clone()
            .filter(|tz| !tz.is_empty())
            .unwrap_or_else(local_timezone)
    }
}
