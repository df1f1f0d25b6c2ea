//! Unified path management for fcu configuration and logs.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/fcu/               # Config directory
//! ├── config.toml              # Client configuration
//! └── logs/                    # Default log directory
//!     └── fcu-client.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

const APP_DIR: &str = "fcu";

/// Unified path management for fcu.
pub struct FcuPaths;

impl FcuPaths {
    /// Returns the fcu configuration directory (e.g. `~/.config/fcu/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default log directory.
    pub fn log_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("logs"))
    }

    /// Unity Hub's per-user settings directory.
    ///
    /// Holds `editors.json`, `secondaryInstallPath.json` and
    /// `defaultEditor.json`.
    pub fn unity_hub_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("UnityHub"))
    }
}
