//! Storage abstraction for persistence.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::dump::{BoxDump, LoadError};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Box not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Corrupt box file: {0}")]
    Corrupt(#[from] LoadError),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for box storage backends, keyed by box name.
pub trait Storage: Send + Sync {
    /// Save a box.
    fn save(&self, name: &str, dump: &BoxDump) -> StorageResult<()>;

    /// Load a box.
    fn load(&self, name: &str) -> StorageResult<BoxDump>;

    /// Delete a box. Deleting a missing box is not an error.
    fn delete(&self, name: &str) -> StorageResult<()>;

    /// List all stored box names.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a box exists.
    fn exists(&self, name: &str) -> StorageResult<bool>;
}

/// Write a box to an arbitrary path.
pub fn save_to_path(path: &Path, dump: &BoxDump) -> StorageResult<()> {
    let json = dump.to_json().map_err(|e| StorageError::Serialization(e.to_string()))?;
    fs::write(path, json).map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    log::info!("saved box {:?} to {}", dump.name, path.display());
    Ok(())
}

/// Read a box from an arbitrary path.
pub fn load_from_path(path: &Path) -> StorageResult<BoxDump> {
    if !path.exists() {
        return Err(StorageError::NotFound(path.display().to_string()));
    }
    let json = fs::read_to_string(path)
        .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    let dump = BoxDump::from_json(&json)?;
    log::info!("loaded box {:?} from {} ({} decks)", dump.name, path.display(), dump.decks.len());
    Ok(dump)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::DeckDump;
    use tempfile::tempdir;

    #[test]
    fn test_path_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.json");
        let dump = BoxDump::new("notes", vec![DeckDump::default()]);

        save_to_path(&path, &dump).unwrap();
        assert_eq!(load_from_path(&path).unwrap(), dump);
    }

    #[test]
    fn test_load_missing_path() {
        let dir = tempdir().unwrap();
        let result = load_from_path(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_load_corrupt_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{\"decks\": [{\"cards\": {\"1\": {\"class\": \"Sticker\"}}}]}").unwrap();
        let result = load_from_path(&path);
        assert!(matches!(result, Err(StorageError::Corrupt(LoadError::InvalidKind(_)))));
    }
}
