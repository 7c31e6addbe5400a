//! Cardbox Core Library
//!
//! Card model, decks, selection and board layout for the Cardbox note board.
//! Nothing here depends on a windowing toolkit.

pub mod board;
pub mod cardbox;
pub mod cards;
pub mod clipboard;
pub mod deck;
pub mod dump;
pub mod geometry;
pub mod group;
pub mod input;
pub mod reactive;
pub mod selection;
pub mod storage;
pub mod tags;
pub mod viewport;

pub use board::{Board, BoardConfig, BoardEvent, CardView, Orientation};
pub use cardbox::CardBox;
pub use cards::{Card, CardError, CardField, CardId, CardKind, CardTrait, Content, ContentKind, Header, Image, SerializableColor};
pub use clipboard::{Clipboard, ClipboardPayload, MemoryClipboard};
pub use deck::{Deck, DeckError, DeckField, Line};
pub use dump::{BoxDump, CardDump, DeckDump, GroupDump, LoadError, DUMP_VERSION};
pub use group::{CardGroup, GroupId};
pub use input::{Direction, Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use reactive::{Observers, SubscriptionId};
pub use selection::{Focus, KeyAction, SelectionManager, SelectionState};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use tags::{Tag, TagIndex, extract_tags};
pub use viewport::Viewport;
