//! A box: the decks persisted together in one file.

use crate::deck::Deck;
use crate::dump::{BoxDump, LoadError};
use crate::storage::{self, Storage, StorageResult};
use std::path::{Path, PathBuf};

/// The unit of "open file" and "save file".
#[derive(Debug, Default)]
pub struct CardBox {
    pub name: String,
    /// Where the box was last opened from or saved to.
    pub path: Option<PathBuf>,
    pub decks: Vec<Deck>,
}

impl CardBox {
    /// A new box with one empty deck.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            decks: vec![Deck::new(name.clone())],
            name,
            path: None,
        }
    }

    pub fn dump(&self) -> BoxDump {
        BoxDump::new(self.name.clone(), self.decks.iter().map(Deck::dump).collect())
    }

    /// Build a box from a dump. Every deck must load for the box to load.
    pub fn from_dump(dump: &BoxDump) -> Result<Self, LoadError> {
        let decks = dump.decks.iter().map(Deck::from_dump).collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: dump.name.clone(),
            path: None,
            decks,
        })
    }

    /// Open a box file.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let dump = storage::load_from_path(path)?;
        let mut cardbox = Self::from_dump(&dump)?;
        if cardbox.name.is_empty() {
            cardbox.name = file_stem(path);
        }
        cardbox.path = Some(path.to_path_buf());
        Ok(cardbox)
    }

    /// Save to the path the box was opened from. `NotFound` if it has none.
    pub fn save(&self) -> StorageResult<()> {
        match &self.path {
            Some(path) => storage::save_to_path(path, &self.dump()),
            None => Err(storage::StorageError::NotFound(self.name.clone())),
        }
    }

    /// Save to `path` and remember it.
    pub fn save_as(&mut self, path: &Path) -> StorageResult<()> {
        storage::save_to_path(path, &self.dump())?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Load the box stored under `name`.
    pub fn load_from(storage: &dyn Storage, name: &str) -> StorageResult<Self> {
        let dump = storage.load(name)?;
        let mut cardbox = Self::from_dump(&dump)?;
        if cardbox.name.is_empty() {
            cardbox.name = name.to_string();
        }
        Ok(cardbox)
    }

    pub fn deck(&self, index: usize) -> Option<&Deck> {
        self.decks.get(index)
    }

    pub fn deck_mut(&mut self, index: usize) -> Option<&mut Deck> {
        self.decks.get_mut(index)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardKind;
    use crate::storage::{MemoryStorage, StorageError};
    use kurbo::Rect;
    use tempfile::tempdir;

    #[test]
    fn test_save_as_then_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("thesis.json");

        let mut cardbox = CardBox::new("thesis");
        let deck = &mut cardbox.decks[0];
        let a = deck.new_card(CardKind::Content, Rect::new(15.0, 15.0, 265.0, 165.0));
        let b = deck.new_card(CardKind::Header, Rect::new(300.0, 15.0, 450.0, 47.0));
        deck.add_group([a, b]);

        assert!(matches!(cardbox.save(), Err(StorageError::NotFound(_))));
        cardbox.save_as(&path).unwrap();

        let opened = CardBox::open(&path).unwrap();
        assert_eq!(opened.name, "thesis");
        assert_eq!(opened.path.as_deref(), Some(path.as_path()));
        assert_eq!(opened.decks.len(), 1);
        assert_eq!(opened.decks[0].id(), cardbox.decks[0].id());
        assert_eq!(opened.dump(), cardbox.dump());
    }

    #[test]
    fn test_load_from_storage() {
        let storage = MemoryStorage::new();
        let mut cardbox = CardBox::new("inbox");
        cardbox.decks[0].new_card(CardKind::Image, Rect::new(0.0, 0.0, 50.0, 50.0));
        storage.save("inbox", &cardbox.dump()).unwrap();

        let loaded = CardBox::load_from(&storage, "inbox").unwrap();
        assert_eq!(loaded.dump(), cardbox.dump());
        assert!(loaded.path.is_none());
        assert!(matches!(CardBox::load_from(&storage, "other"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_open_unnamed_uses_file_stem() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inbox.json");
        std::fs::write(&path, r#"{"cards": {}}"#).unwrap();

        let opened = CardBox::open(&path).unwrap();
        assert_eq!(opened.name, "inbox");
        assert_eq!(opened.decks.len(), 1);
    }
}
