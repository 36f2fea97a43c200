//! Client configuration.
//!
//! The API base URL is resolved once and injected into the client:
//! - explicit value (CLI flag)
//! - `FINGERPRINT_API_URL`
//! - TOML file named by `FINGERPRINT_CONFIG`
//! - built-in default

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};

pub const ENV_API_URL: &str = "FINGERPRINT_API_URL";
pub const ENV_CONFIG_FILE: &str = "FINGERPRINT_CONFIG";
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the access-control API, without a trailing slash.
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> ConfigResult<Self> {
        let base_url: String = base_url.into();
        let config = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        debug!(path = %path.display(), "loaded client config file");
        Self::new(config.base_url)
    }

    /// Resolve the configuration, preferring `explicit` when given.
    pub fn load(explicit: Option<&str>) -> ConfigResult<Self> {
        if let Some(url) = explicit {
            return Self::new(url);
        }
        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.is_empty() {
                return Self::new(url);
            }
        }
        if let Ok(path) = std::env::var(ENV_CONFIG_FILE) {
            return Self::from_file(Path::new(&path));
        }
        info!(base_url = DEFAULT_API_URL, "no API URL configured, using default");
        Ok(Self::default())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "base_url cannot be empty".to_string(),
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }
        Ok(())
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
