//! Clipboard channel used by copy and paste.

use crate::dump::CardDump;
use serde::{Deserialize, Serialize};

/// An opaque byte transport supplied by the host.
pub trait Clipboard {
    /// Replace the clipboard contents.
    fn put(&mut self, data: Vec<u8>);

    /// Current contents, or `None` when empty or unavailable.
    fn get(&mut self) -> Option<Vec<u8>>;
}

/// What copy writes: card dumps in unscaled coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClipboardPayload {
    pub cards: Vec<CardDump>,
}

impl ClipboardPayload {
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}

/// In-process clipboard for tests and headless use.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    data: Option<Vec<u8>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.data = None;
    }
}

impl Clipboard for MemoryClipboard {
    fn put(&mut self, data: Vec<u8>) {
        self.data = Some(data);
    }

    fn get(&mut self) -> Option<Vec<u8>> {
        self.data.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard() {
        let mut clip = MemoryClipboard::new();
        assert_eq!(clip.get(), None);
        clip.put(b"abc".to_vec());
        assert_eq!(clip.get(), Some(b"abc".to_vec()));
        clip.clear();
        assert_eq!(clip.get(), None);
    }

    #[test]
    fn test_payload_bytes() {
        let payload = ClipboardPayload {
            cards: vec![CardDump::Header {
                rect: [1.0, 2.0, 3.0, 4.0],
                header: "h".to_string(),
            }],
        };
        let bytes = payload.to_bytes().unwrap();
        assert_eq!(ClipboardPayload::from_bytes(&bytes).unwrap(), payload);
        assert!(ClipboardPayload::from_bytes(b"not json").is_err());
    }
}
