//! An opened box: one board per deck, plus the clipboard they share.

use crate::config::AppConfig;
use cardbox_core::storage::{self, Storage, StorageError};
use cardbox_core::{Board, BoxDump, CardBox, CardId, Clipboard, Deck};
use kurbo::Point;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("No deck at index {0}")]
    NoSuchDeck(usize),
    #[error("Session has never been saved")]
    NoPath,
}

/// A box being edited.
pub struct Session {
    pub name: String,
    pub path: Option<PathBuf>,
    boards: Vec<Board>,
    clipboard: Box<dyn Clipboard>,
    config: AppConfig,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("boards", &self.boards.len())
            .finish()
    }
}

#[cfg(feature = "native")]
fn default_clipboard() -> Box<dyn Clipboard> {
    Box::new(crate::clipboard::SystemClipboard::new())
}

#[cfg(not(feature = "native"))]
fn default_clipboard() -> Box<dyn Clipboard> {
    Box::new(cardbox_core::MemoryClipboard::new())
}

impl Session {
    /// A new unsaved box with one empty deck.
    pub fn new(name: impl Into<String>, config: AppConfig) -> Self {
        Self::from_box(CardBox::new(name), config)
    }

    /// Open a box file.
    pub fn open(path: &Path, config: AppConfig) -> Result<Self, SessionError> {
        let cardbox = CardBox::open(path)?;
        Ok(Self::from_box(cardbox, config))
    }

    /// Open `path`, or start a new box there if no file exists yet.
    pub fn open_or_create(path: &Path, config: AppConfig) -> Result<Self, SessionError> {
        if path.exists() {
            return Self::open(path, config);
        }
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled")
            .to_string();
        log::info!("creating new box {:?} at {}", name, path.display());
        let mut session = Self::new(name, config);
        session.path = Some(path.to_path_buf());
        Ok(session)
    }

    /// Open the box stored under `name`.
    pub fn open_in(storage: &dyn Storage, name: &str, config: AppConfig) -> Result<Self, SessionError> {
        let cardbox = CardBox::load_from(storage, name)?;
        Ok(Self::from_box(cardbox, config))
    }

    /// Open the box stored under `name`, or start a new one with that name.
    pub fn open_or_create_in(storage: &dyn Storage, name: &str, config: AppConfig) -> Result<Self, SessionError> {
        if storage.exists(name)? {
            return Self::open_in(storage, name, config);
        }
        log::info!("creating new box {:?} in storage", name);
        Ok(Self::new(name, config))
    }

    fn from_box(cardbox: CardBox, config: AppConfig) -> Self {
        let CardBox { name, path, decks } = cardbox;
        let boards = decks
            .into_iter()
            .map(|deck| Board::new(deck, config.board.clone()))
            .collect();
        Self {
            name,
            path,
            boards,
            clipboard: default_clipboard(),
            config,
        }
    }

    /// Swap the clipboard channel.
    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn board(&self, index: usize) -> Option<&Board> {
        self.boards.get(index)
    }

    pub fn board_mut(&mut self, index: usize) -> Option<&mut Board> {
        self.boards.get_mut(index)
    }

    /// Append an empty deck. Returns its index.
    pub fn add_deck(&mut self, name: impl Into<String>) -> usize {
        self.boards.push(Board::new(Deck::new(name), self.config.board.clone()));
        self.boards.len() - 1
    }

    /// Copy board `index`'s selection to the clipboard.
    pub fn copy(&mut self, index: usize) -> Result<usize, SessionError> {
        let board = self.boards.get(index).ok_or(SessionError::NoSuchDeck(index))?;
        Ok(board.copy_selection(self.clipboard.as_mut()))
    }

    /// Paste into board `index`, optionally at a deck position.
    pub fn paste(&mut self, index: usize, position: Option<Point>) -> Result<Vec<CardId>, SessionError> {
        let board = self.boards.get_mut(index).ok_or(SessionError::NoSuchDeck(index))?;
        Ok(board.paste(self.clipboard.as_mut(), position))
    }

    /// Every deck at scale 1.
    pub fn dump(&self) -> BoxDump {
        BoxDump::new(self.name.clone(), self.boards.iter().map(Board::dump).collect())
    }

    /// Save to the session's path.
    pub fn save(&self) -> Result<(), SessionError> {
        let path = self.path.as_deref().ok_or(SessionError::NoPath)?;
        storage::save_to_path(path, &self.dump())?;
        Ok(())
    }

    /// Store under the session's name.
    pub fn save_to(&self, storage: &dyn Storage) -> Result<(), SessionError> {
        storage.save(&self.name, &self.dump())?;
        Ok(())
    }

    /// Save to `path` and make it the session's path.
    pub fn save_as(&mut self, path: &Path) -> Result<(), SessionError> {
        storage::save_to_path(path, &self.dump())?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardbox_core::{CardKind, MemoryClipboard, MemoryStorage};
    use tempfile::tempdir;

    fn session() -> Session {
        Session::new("test", AppConfig::default()).with_clipboard(Box::new(MemoryClipboard::new()))
    }

    #[test]
    fn test_new_session_has_one_deck() {
        let s = session();
        assert_eq!(s.boards().len(), 1);
        assert!(matches!(s.save(), Err(SessionError::NoPath)));
    }

    #[test]
    fn test_copy_between_decks() {
        let mut s = session();
        let second = s.add_deck("second");
        let board = s.board_mut(0).unwrap();
        let id = board.add_card(CardKind::Content, Point::new(15.0, 15.0));
        board.select(id, true);

        assert_eq!(s.copy(0).unwrap(), 1);
        let pasted = s.paste(second, Some(Point::new(100.0, 100.0))).unwrap();
        assert_eq!(pasted.len(), 1);
        let card = s.board(second).unwrap().card(pasted[0]).unwrap();
        assert_eq!(card.position(), Point::new(100.0, 100.0));
        assert!(matches!(s.paste(7, None), Err(SessionError::NoSuchDeck(7))));
    }

    #[test]
    fn test_save_as_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.json");
        let mut s = session();
        s.add_deck("extra");
        s.board_mut(1).unwrap().add_card(CardKind::Header, Point::new(15.0, 15.0));
        s.save_as(&path).unwrap();

        let reopened = Session::open(&path, AppConfig::default()).unwrap();
        assert_eq!(reopened.boards().len(), 2);
        assert_eq!(reopened.board(1).unwrap().deck().len(), 1);
        assert_eq!(reopened.dump(), s.dump());
    }

    #[test]
    fn test_storage_round_trip() {
        let storage = MemoryStorage::new();
        let mut s = Session::open_or_create_in(&storage, "inbox", AppConfig::default())
            .unwrap()
            .with_clipboard(Box::new(MemoryClipboard::new()));
        assert!(s.boards()[0].deck().is_empty());
        s.board_mut(0).unwrap().add_card(CardKind::Content, Point::new(15.0, 15.0));
        s.save_to(&storage).unwrap();
        assert_eq!(storage.list().unwrap(), vec!["inbox".to_string()]);

        let reopened = Session::open_or_create_in(&storage, "inbox", AppConfig::default()).unwrap();
        assert_eq!(reopened.name, "inbox");
        assert!(reopened.path.is_none());
        assert_eq!(reopened.dump(), s.dump());
    }

    #[test]
    fn test_open_missing_in_storage() {
        let storage = MemoryStorage::new();
        let result = Session::open_in(&storage, "nope", AppConfig::default());
        assert!(matches!(result, Err(SessionError::Storage(StorageError::NotFound(_)))));
    }

    #[test]
    fn test_open_or_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fresh.json");
        let s = Session::open_or_create(&path, AppConfig::default()).unwrap();
        assert_eq!(s.name, "fresh");
        s.save().unwrap();
        assert!(path.exists());
    }
}
