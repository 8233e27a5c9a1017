//! Configuration service implementation.
//!
//! Loads `config.toml` from the Bill-a config directory, creating it with
//! defaults on first run, then layers `BILLA_*` environment overrides on top.

use crate::paths::BillaPaths;
use billa_core::config::BillaConfig;
use billa_core::{BillaError, Result};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Environment variables that override values from config.toml.
pub const ENV_SCAN_URL: &str = "BILLA_SCAN_URL";
pub const ENV_SPLIT_URL: &str = "BILLA_SPLIT_URL";
pub const ENV_CHAT_URL: &str = "BILLA_CHAT_URL";
pub const ENV_TIMEOUT_SECS: &str = "BILLA_TIMEOUT_SECS";
pub const ENV_STORE_URL: &str = "BILLA_STORE_URL";
pub const ENV_STORE_ANON_KEY: &str = "BILLA_STORE_ANON_KEY";
pub const ENV_LOG_LEVEL: &str = "BILLA_LOG_LEVEL";

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: BillaPaths,
    /// Cached configuration, filled on first access.
    config: Arc<RwLock<Option<BillaConfig>>>,
}

impl ConfigService {
    pub fn new(paths: BillaPaths) -> Self {
        Self {
            paths,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<BillaConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|p| p.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let config_path = self.paths.config_file()?;
        let mut loaded = load_or_create(&config_path)?;
        apply_env_overrides(&mut loaded, |key| std::env::var(key).ok());

        let mut write_lock = self.config.write().unwrap_or_else(|p| p.into_inner());
        *write_lock = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|p| p.into_inner());
        *write_lock = None;
    }

    pub fn paths(&self) -> &BillaPaths {
        &self.paths
    }
}

/// Reads the config file, writing a default one when it does not exist yet.
fn load_or_create(path: &Path) -> Result<BillaConfig> {
    if !path.exists() {
        let config = BillaConfig::default();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(&config)?)?;
        tracing::info!("[ConfigService] Created default config at {}", path.display());
        return Ok(config);
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(BillaConfig::default());
    }
    toml::from_str(&content).map_err(|e| {
        BillaError::config(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Applies `BILLA_*` overrides. Blank values are ignored.
pub fn apply_env_overrides<F>(config: &mut BillaConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(value) = get(ENV_SCAN_URL) {
        config.api.scan_url = value;
    }
    if let Some(value) = get(ENV_SPLIT_URL) {
        config.api.split_url = value;
    }
    if let Some(value) = get(ENV_CHAT_URL) {
        config.api.chat_url = value;
    }
    if let Some(value) = get(ENV_TIMEOUT_SECS) {
        match value.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => config.api.timeout_secs = secs,
            _ => tracing::warn!("[ConfigService] Ignoring invalid {}={}", ENV_TIMEOUT_SECS, value),
        }
    }
    if let Some(value) = get(ENV_STORE_URL) {
        config.store.url = value;
    }
    if let Some(value) = get(ENV_STORE_ANON_KEY) {
        config.store.anon_key = value;
    }
    if let Some(value) = get(ENV_LOG_LEVEL) {
        config.logging.level = value;
    }
}
