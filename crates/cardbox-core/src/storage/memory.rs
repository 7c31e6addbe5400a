//! In-memory storage implementation.

use super::{Storage, StorageError, StorageResult};
use crate::dump::BoxDump;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    boxes: RwLock<HashMap<String, BoxDump>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, name: &str, dump: &BoxDump) -> StorageResult<()> {
        let mut boxes = self.boxes.write().map_err(lock_error)?;
        boxes.insert(name.to_string(), dump.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> StorageResult<BoxDump> {
        let boxes = self.boxes.read().map_err(lock_error)?;
        boxes
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    fn delete(&self, name: &str) -> StorageResult<()> {
        let mut boxes = self.boxes.write().map_err(lock_error)?;
        boxes.remove(name);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let boxes = self.boxes.read().map_err(lock_error)?;
        let mut names: Vec<String> = boxes.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        let boxes = self.boxes.read().map_err(lock_error)?;
        Ok(boxes.contains_key(name))
    }
}
