//! File-based storage.

use super::{Storage, StorageError, StorageResult, load_from_path, save_to_path};
use crate::dump::BoxDump;
use std::fs;
use std::path::{Path, PathBuf};

/// Stores boxes as JSON files in a directory.
pub struct FileStorage {
    /// Base directory for box files.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(|e| StorageError::Io(format!("Failed to create storage directory: {}", e)))?;
        }
        Ok(Self { base_path })
    }

    /// Directory used when nothing is configured.
    ///
    /// On Unix: `~/.local/share/cardbox/boxes/`
    /// On Windows: `%LOCALAPPDATA%\cardbox\boxes\`
    pub fn default_dir() -> StorageResult<PathBuf> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Ok(base.join("cardbox").join("boxes"))
    }

    /// Create file storage in the default location.
    pub fn default_location() -> StorageResult<Self> {
        Self::new(Self::default_dir()?)
    }

    /// File path for a box name.
    pub fn box_path(&self, name: &str) -> PathBuf {
        Self::path_in(&self.base_path, name)
    }

    /// File path a box name maps to inside `dir`. Touches nothing on disk.
    pub fn path_in(dir: &Path, name: &str) -> PathBuf {
        // Sanitize name to be safe for filenames
        let safe: String = name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        dir.join(format!("{}.json", safe))
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, name: &str, dump: &BoxDump) -> StorageResult<()> {
        save_to_path(&self.box_path(name), dump)
    }

    fn load(&self, name: &str) -> StorageResult<BoxDump> {
        let path = self.box_path(name);
        if !path.exists() {
            return Err(StorageError::NotFound(name.to_string()));
        }
        load_from_path(&path)
    }

    fn delete(&self, name: &str) -> StorageResult<()> {
        let path = self.box_path(name);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| StorageError::Io(format!("Failed to delete {}: {}", path.display(), e)))?;
        }
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }

        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let mut names = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.box_path(name).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::DeckDump;
    use tempfile::tempdir;

    fn sample(name: &str) -> BoxDump {
        let deck = DeckDump {
            name: "first".to_string(),
            ..DeckDump::default()
        };
        BoxDump::new(name, vec![deck])
    }

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.save("research", &sample("Research")).unwrap();
        let loaded = storage.load("research").unwrap();

        assert_eq!(loaded.name, "Research");
        assert_eq!(loaded.decks[0].name, "first");
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let result = storage.load("nonexistent");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_list() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.save("box2", &sample("b")).unwrap();
        storage.save("box1", &sample("a")).unwrap();
        fs::write(dir.path().join("readme.txt"), "ignored").unwrap();

        assert_eq!(storage.list().unwrap(), vec!["box1".to_string(), "box2".to_string()]);
    }

    #[test]
    fn test_file_storage_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.save("test", &sample("t")).unwrap();
        assert!(storage.exists("test").unwrap());

        storage.delete("test").unwrap();
        assert!(!storage.exists("test").unwrap());
        storage.delete("test").unwrap();
    }

    #[test]
    fn test_path_in_does_not_create_dir() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("not-yet");
        assert_eq!(FileStorage::path_in(&missing, "a b"), missing.join("a_b.json"));
        assert!(!missing.exists());
    }

    #[test]
    fn test_file_storage_sanitizes_name() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.save("my/box:with*special", &sample("x")).unwrap();
        assert_eq!(storage.box_path("my/box:with*special"), dir.path().join("my_box_with_special.json"));
        assert_eq!(storage.load("my/box:with*special").unwrap().name, "x");
    }
}
