//! Application configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer. Every field has a
//! default so a partial (or missing) file is always valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SCAN_URL: &str = "https://dizzy-michele-pravinraj-codes-1a321834.koyeb.app";
pub const DEFAULT_CHAT_URL: &str = "https://favourable-eunice-pravinraj-code-24722b81.koyeb.app";
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;
pub const DEFAULT_INSTRUCTION: &str = "Split equally";
pub const DEFAULT_CURRENCY: &str = "RM";

/// Root configuration structure for config.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillaConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Endpoints of the external AI collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_scan_url")]
    pub scan_url: String,
    #[serde(default = "default_scan_url")]
    pub split_url: String,
    #[serde(default = "default_chat_url")]
    pub chat_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            scan_url: default_scan_url(),
            split_url: default_scan_url(),
            chat_url: default_chat_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Hosted database/auth backend.
///
/// An empty `url` means no backend is configured and the app runs in guest mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
}

impl StoreSettings {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_instruction")]
    pub default_instruction: String,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default = "default_true")]
    pub include_tax_by_default: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_instruction: default_instruction(),
            default_currency: default_currency(),
            include_tax_by_default: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_logging: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_logging: false,
        }
    }
}

fn default_scan_url() -> String {
    DEFAULT_SCAN_URL.to_string()
}

fn default_chat_url() -> String {
    DEFAULT_CHAT_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_instruction() -> String {
    DEFAULT_INSTRUCTION.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
