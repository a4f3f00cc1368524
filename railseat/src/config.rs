//! Configuration management for the railseat client.
//!
//! Loads configuration from environment variables with sensible defaults.
//! `main` loads a `.env` file first, so either source works.

use railseat_client::DEFAULT_API_URL;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the stored token, relative to the working directory.
pub const DEFAULT_TOKEN_PATH: &str = ".railseat/token";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend base URL (`RAILSEAT_API_URL`)
    pub api_url: String,
    /// Time between seat map refreshes (`RAILSEAT_POLL_INTERVAL_MS`, default 1500)
    pub poll_interval: Duration,
    /// Per-request HTTP timeout (`RAILSEAT_REQUEST_TIMEOUT_SECS`, default 10)
    pub request_timeout: Duration,
    /// Where the session token is kept (`RAILSEAT_TOKEN_PATH`)
    pub token_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval: Duration::from_millis(1500),
            request_timeout: Duration::from_secs(10),
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            api_url: lookup("RAILSEAT_API_URL")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.api_url),
            poll_interval: lookup("RAILSEAT_POLL_INTERVAL_MS")
                .and_then(|s| s.parse().ok())
                .filter(|ms| *ms > 0)
                .map_or(defaults.poll_interval, Duration::from_millis),
            request_timeout: lookup("RAILSEAT_REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .map_or(defaults.request_timeout, Duration::from_secs),
            token_path: lookup("RAILSEAT_TOKEN_PATH")
                .filter(|s| !s.trim().is_empty())
                .map_or(defaults.token_path, PathBuf::from),
        }
    }

    /// How long a view waits for a booking, reset, or refresh outcome.
    #[must_use]
    pub fn wait_timeout(&self) -> Duration {
        self.request_timeout * 2
    }
}
