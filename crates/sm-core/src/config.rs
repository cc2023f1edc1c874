use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration loaded from `~/.config/studymate/settings.toml`.
///
/// **Security**: this struct never stores passwords or tokens. Credentials
/// are entered at runtime (`sm auth login`) and held only in memory.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub study: StudyConfig,
}

impl Config {
    /// Serialize to pretty TOML for writing back to disk.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("backend.base_url must not be empty".into()));
        }
        if !self.backend.base_url.starts_with("http://") && !self.backend.base_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(format!(
                "backend.base_url must be an http(s) URL, got `{}`",
                self.backend.base_url
            )));
        }
        if self.backend.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "backend.request_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.backend.delivery_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "backend.delivery_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.study.default_card_count == 0 || self.study.default_quiz_length == 0 {
            return Err(ConfigError::Validation(
                "study counts must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(String),
    #[error("parse: {0}")]
    Parse(String),
    #[error("validation: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Section structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable output.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for interactive requests (chat, study material).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Timeout for a single performance-update delivery attempt.
    #[serde(default = "default_delivery_timeout")]
    pub delivery_timeout_secs: u64,
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            delivery_timeout_secs: default_delivery_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    /// Backend user identifier; required before study results can be saved.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    #[serde(default = "default_card_count")]
    pub default_card_count: u32,
    #[serde(default = "default_quiz_length")]
    pub default_quiz_length: u32,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            default_card_count: default_card_count(),
            default_quiz_length: default_quiz_length(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://api.studymate.app".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_delivery_timeout() -> u64 {
    10
}

fn default_card_count() -> u32 {
    10
}

fn default_quiz_length() -> u32 {
    5
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
