//! Unified path management for Bill-a's local files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/billa/             # Config directory
//! ├── config.toml              # Application configuration
//! ├── auth_session.json        # Persisted sign-in session
//! └── logs/                    # Application logs
//!     └── billa.log.YYYY-MM-DD
//! ```

use billa_core::BillaError;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "billa";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for BillaError {
    fn from(err: PathError) -> Self {
        BillaError::config(err.to_string())
    }
}

/// Resolves the locations of Bill-a's local files.
///
/// With a base path every file lives directly under it, which keeps tests
/// away from the real config directory.
#[derive(Debug, Clone, Default)]
pub struct BillaPaths {
    base: Option<PathBuf>,
}

impl BillaPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the configuration directory (e.g. `~/.config/billa/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path of the persisted sign-in session.
    ///
    /// The file holds a bearer token, so it is written with mode 600 on Unix.
    pub fn auth_session_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("auth_session.json"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}
