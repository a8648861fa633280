//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the client configuration
//! from the configuration file (~/.config/learnstack/config.toml) and applies
//! environment variable overrides on top.

use crate::paths::LearnstackPaths;
use learnstack_core::config::ClientConfig;
use learnstack_core::error::{LearnstackError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Overrides `base_url`.
pub const ENV_BASE_URL: &str = "LEARNSTACK_BASE_URL";
/// Overrides `typing_delay_ms`.
pub const ENV_TYPING_DELAY_MS: &str = "LEARNSTACK_TYPING_DELAY_MS";

/// Configuration service that loads and caches the client configuration.
///
/// A missing or empty file is not an error: the defaults are used.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Explicit file location; `None` means the platform default.
    path: Option<PathBuf>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService reading the default config file.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a ConfigService reading `path` instead of the default location.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading it on first access.
    ///
    /// Load failures are logged and replaced by the defaults so a broken file
    /// never keeps the client from starting.
    pub fn get_config(&self) -> ClientConfig {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref config) = *cached {
                return config.clone();
            }
        }

        let loaded = self.try_load().unwrap_or_else(|e| {
            tracing::warn!("[ConfigService] Falling back to default config: {}", e);
            ClientConfig::default()
        });

        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = Some(loaded.clone());
        loaded
    }

    /// Loads the configuration without touching the cache.
    pub fn try_load(&self) -> Result<ClientConfig> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => LearnstackPaths::config_file()
                .map_err(|e| LearnstackError::config(e.to_string()))?,
        };

        let config = load_file(&path)?;
        apply_env_overrides(config, |key| std::env::var(key).ok())
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = None;
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

fn load_file(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        tracing::debug!("[ConfigService] No config file at {:?}", path);
        return Ok(ClientConfig::default());
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(ClientConfig::default());
    }

    Ok(toml::from_str(&content)?)
}

fn apply_env_overrides(
    mut config: ClientConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig> {
    if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
        config.base_url = base_url.trim().to_string();
    }

    if let Some(delay) = lookup(ENV_TYPING_DELAY_MS) {
        config.typing_delay_ms = delay.trim().parse().map_err(|_| {
            LearnstackError::config(format!("{ENV_TYPING_DELAY_MS} must be a number, got '{delay}'"))
        })?;
    }

    Ok(config)
}
