//! Settings persistence
//!
//! Saves and loads curator settings as a versioned JSON file. A missing
//! file loads as defaults so a fresh install works without setup.

use super::settings::CuratorSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Error types for settings persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// File I/O error
    IoError(String),
    /// JSON serialization/deserialization error
    JsonError(String),
    /// Invalid data format
    InvalidData(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::IoError(msg) => write!(f, "IO Error: {}", msg),
            StoreError::JsonError(msg) => write!(f, "JSON Error: {}", msg),
            StoreError::InvalidData(msg) => write!(f, "Invalid Data: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Versioned on-disk form of the settings file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsFile {
    /// Version of the file format (for future migration support)
    version: u32,
    /// The persisted settings
    settings: CuratorSettings,
}

/// Persistence seam for curator settings
pub trait ConfigStore: Send + Sync {
    /// Load the persisted settings, or defaults if none exist yet
    fn load(&self) -> Result<CuratorSettings, StoreError>;

    /// Persist the settings
    fn save(&self, settings: &CuratorSettings) -> Result<(), StoreError>;
}

/// JSON-file-backed settings store
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    /// Create a store over the given file path
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the default path for the settings file
    /// Returns a path in the user's home directory or current directory
    pub fn default_path() -> PathBuf {
        if let Some(home) = std::env::var_os("HOME") {
            let mut path = PathBuf::from(home);
            path.push(".cosmos-curator");
            path.push("settings.json");
            path
        } else {
            PathBuf::from("settings.json")
        }
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> Result<CuratorSettings, StoreError> {
        if !self.path.exists() {
            return Ok(CuratorSettings::default());
        }

        let json =
            fs::read_to_string(&self.path).map_err(|e| StoreError::IoError(e.to_string()))?;

        let file: SettingsFile =
            serde_json::from_str(&json).map_err(|e| StoreError::JsonError(e.to_string()))?;

        // Validate version (for future migration support)
        if file.version != 1 {
            return Err(StoreError::InvalidData(format!(
                "Unsupported settings version: {}",
                file.version
            )));
        }

        Ok(file.settings)
    }

    fn save(&self, settings: &CuratorSettings) -> Result<(), StoreError> {
        let file = SettingsFile {
            version: 1,
            settings: settings.clone(),
        };

        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| StoreError::JsonError(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StoreError::IoError(e.to_string()))?;
            }
        }

        fs::write(&self.path, json).map_err(|e| StoreError::IoError(e.to_string()))?;

        Ok(())
    }
}
