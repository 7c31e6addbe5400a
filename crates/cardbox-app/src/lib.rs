//! Cardbox Application
//!
//! The application shell around the core board: configuration, the system
//! clipboard and the open box session.

#[cfg(feature = "native")]
mod clipboard;
mod config;
mod session;
mod shortcuts;

#[cfg(feature = "native")]
pub use clipboard::SystemClipboard;
pub use config::{AppConfig, ConfigError};
pub use session::{Session, SessionError};
pub use shortcuts::{Shortcut, ShortcutRegistry};
