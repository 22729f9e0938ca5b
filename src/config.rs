//! Runtime configuration
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. The inference base URL is never hardcoded.

use crate::error::{Result, ScreeningError};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_API_BASE_URL: &str = "RETINA_API_BASE_URL";
pub const ENV_REQUEST_TIMEOUT: &str = "RETINA_REQUEST_TIMEOUT_SECS";
pub const ENV_REPORT_DIR: &str = "RETINA_REPORT_DIR";

/// Default timeout applied by the transport layer
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningConfig {
    /// Base URL of the inference service, without trailing slash
    pub api_base_url: String,
    /// Transport-level timeout for the predict call
    pub request_timeout: Duration,
    /// Directory generated reports are written into
    pub report_dir: PathBuf,
}

impl ScreeningConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: normalize_base_url(&api_base_url.into()),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            report_dir: default_report_dir(),
        }
    }

    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load configuration from `.env` and the environment
    pub fn from_env() -> Result<Self> {
        // During development the CWD may be the project root or a subdirectory
        if dotenvy::dotenv().is_err() {
            let _ = dotenvy::from_path("../.env");
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_API_BASE_URL)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ScreeningError::Config(format!("{} is not set", ENV_API_BASE_URL)))?;

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ScreeningError::Config(format!(
                "{} must be an http(s) URL, got '{}'",
                ENV_API_BASE_URL, base_url
            )));
        }

        let mut config = Self::new(base_url);

        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ScreeningError::Config(format!("{} must be a whole number of seconds", ENV_REQUEST_TIMEOUT))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(dir) = lookup(ENV_REPORT_DIR).filter(|d| !d.trim().is_empty()) {
            config.report_dir = PathBuf::from(dir);
        }

        tracing::debug!(
            base_url = %config.api_base_url,
            timeout_secs = config.request_timeout.as_secs(),
            "[Config] Loaded screening configuration"
        );

        Ok(config)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Reports land in the user's Downloads folder when there is one
fn default_report_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}
