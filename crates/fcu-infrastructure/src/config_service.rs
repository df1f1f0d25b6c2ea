//! Configuration service.
//!
//! Loads `ClientConfig` from `~/.config/fcu/config.toml` (or an explicit
//! path) and caches it for the lifetime of the process.

use crate::paths::FcuPaths;
use crate::storage::{AtomicTomlError, AtomicTomlFile};
use fcu_core::config::ClientConfig;
use fcu_core::{FcuError, Result};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Loads and caches the client configuration.
#[derive(Clone)]
pub struct ConfigService {
    file: Arc<AtomicTomlFile<ClientConfig>>,
    cache: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Uses the default config file location.
    pub fn new() -> Result<Self> {
        let path = FcuPaths::config_file().map_err(|e| FcuError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(path)),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    /// Returns the configuration, reading the file on first access.
    ///
    /// A missing or blank file yields defaults; a malformed file is an error.
    pub fn get_config(&self) -> Result<ClientConfig> {
        if let Some(cached) = self.read_cache() {
            return Ok(cached);
        }

        let loaded = self.file.load()?.unwrap_or_default();
        tracing::debug!(
            "[Config] Loaded configuration from {}",
            self.file.path().display()
        );

        if let Ok(mut guard) = self.cache.write() {
            *guard = Some(loaded.clone());
        }
        Ok(loaded)
    }

    /// Applies `f` to the stored configuration and persists the result.
    ///
    /// The file is locked for the whole cycle. Nothing is written when `f`
    /// fails.
    pub fn update<F>(&self, f: F) -> Result<ClientConfig>
    where
        F: FnOnce(&mut ClientConfig) -> Result<()>,
    {
        let updated = self.file.update(ClientConfig::default(), |config| {
            f(config).map_err(|e| AtomicTomlError::Rejected(e.to_string()))
        })?;

        if let Ok(mut guard) = self.cache.write() {
            *guard = Some(updated.clone());
        }
        Ok(updated)
    }

    /// Sets one setting by its dotted key, e.g. `connection.port`.
    ///
    /// # Errors
    ///
    /// `FcuError::Config` for unknown keys or values of the wrong type.
    pub fn set_value(&self, key: &str, value: Value) -> Result<ClientConfig> {
        self.update(|config| {
            let mut tree = serde_json::to_value(&*config)?;
            let slot = key
                .split('.')
                .try_fold(&mut tree, |node, part| node.get_mut(part))
                .ok_or_else(|| FcuError::config(format!("unknown setting '{}'", key)))?;
            *slot = value;

            *config = serde_json::from_value(tree)
                .map_err(|e| FcuError::config(format!("invalid value for '{}': {}", key, e)))?;
            tracing::info!("[Config] Set {}", key);
            Ok(())
        })
    }

    /// Forces a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut guard) = self.cache.write() {
            *guard = None;
        }
    }

    fn read_cache(&self) -> Option<ClientConfig> {
        self.cache.read().ok().and_then(|guard| guard.clone())
    }
}
