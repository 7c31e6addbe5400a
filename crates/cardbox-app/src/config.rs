//! Application configuration file.

use cardbox_core::BoardConfig;
use cardbox_core::storage::{FileStorage, StorageResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid config {path}: {message}")]
    Parse { path: String, message: String },
}

/// Settings read from `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where boxes opened without a path live.
    pub storage_dir: Option<PathBuf>,
    /// Layout settings for every opened deck.
    pub board: BoardConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: FileStorage::default_dir().ok(),
            board: BoardConfig::default(),
        }
    }
}

impl AppConfig {
    /// Standard config file location, e.g. `~/.config/cardbox/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("cardbox").join("config.json"))
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Read the config from [`AppConfig::default_path`], if there is one.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// The file a box called `name` is stored in when no path is given.
    pub fn box_path(&self, name: &str) -> Option<PathBuf> {
        self.storage_dir.as_deref().map(|dir| FileStorage::path_in(dir, name))
    }

    /// Open the storage directory, creating it if needed.
    pub fn open_storage(&self) -> StorageResult<FileStorage> {
        let dir = match &self.storage_dir {
            Some(dir) => dir.clone(),
            None => FileStorage::default_dir()?,
        };
        FileStorage::new(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.board, BoardConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"storage_dir": "/tmp/boxes", "board": {"card_padding": 20.0}}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.storage_dir, Some(PathBuf::from("/tmp/boxes")));
        assert!((config.board.card_padding - 20.0).abs() < f64::EPSILON);
        assert!((config.board.move_step - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bad_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_box_path() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            storage_dir: Some(dir.path().to_path_buf()),
            ..AppConfig::default()
        };
        assert_eq!(config.box_path("inbox"), Some(dir.path().join("inbox.json")));
    }

    #[test]
    fn test_box_path_leaves_disk_alone() {
        let dir = tempdir().unwrap();
        let boxes = dir.path().join("boxes");
        let config = AppConfig {
            storage_dir: Some(boxes.clone()),
            ..AppConfig::default()
        };
        assert_eq!(config.box_path("inbox"), Some(boxes.join("inbox.json")));
        assert!(!boxes.exists());

        let storage = config.open_storage().unwrap();
        assert!(boxes.is_dir());
        assert_eq!(storage.box_path("inbox"), boxes.join("inbox.json"));
    }
}
