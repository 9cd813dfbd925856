//! Configuration models for autodidact.
//!
//! All I^R (resolvable ignorance) is parameterized here.
//! The user resolves these unknowns at runtime via config file,
//! environment, or command-line flags.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

/// Default learner deployment.
pub const DEFAULT_BASE_URL: &str = "https://autodidactic-tool.onrender.com";

/// Top-level configuration for autodidact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Learner service endpoint
    #[serde(default)]
    pub service: ServiceConfig,

    /// Terminal rendering
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Learner service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the learner API; `${VAR}` placeholders are expanded
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional request timeout in seconds (absent = wait indefinitely)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Terminal rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Colour chart bars (green = present, light gray = absent)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Height of a present bar in terminal rows
    #[serde(default = "default_bar_height")]
    pub bar_height: usize,
}

fn default_true() -> bool {
    true
}

fn default_bar_height() -> usize {
    4
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: default_true(),
            bar_height: default_bar_height(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// B_i(file exists) → Result
    /// B_i(file is valid TOML) → Result
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply a base URL override (from `--url` or `AUTODIDACT_URL`).
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.service.base_url = url;
        }
        self
    }

    /// Base URL with env placeholders expanded and trailing slash removed.
    pub fn resolve_base_url(&self) -> Result<String, ConfigError> {
        let expanded = expand_env_vars(&self.service.base_url);
        let trimmed = expanded.trim_end_matches('/').to_string();

        reqwest::Url::parse(&trimmed).map_err(|e| ConfigError::InvalidUrl {
            url: trimmed.clone(),
            reason: e.to_string(),
        })?;

        Ok(trimmed)
    }

    /// Check all values before the client starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolve_base_url()?;

        if self.display.bar_height == 0 {
            return Err(ConfigError::Invalid(
                "display.bar_height must be at least 1".to_string(),
            ));
        }
        if self.service.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "service.timeout_secs must be positive (omit it for no timeout)".to_string(),
            ));
        }
        Ok(())
    }
}

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// Expand environment variables in a string.
///
/// Supports ${VAR_NAME} syntax.
/// If the variable is not set, the placeholder is left unchanged.
pub fn expand_env_vars(s: &str) -> String {
    let mut result = s.to_string();

    for cap in ENV_PLACEHOLDER.captures_iter(s) {
        if let Ok(value) = std::env::var(&cap[1]) {
            result = result.replace(&cap[0], &value);
        }
    }

    result
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid learner URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
