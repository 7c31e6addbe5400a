//! System clipboard channel.

use cardbox_core::Clipboard;

/// The OS clipboard, carrying the card payload as text.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Clipboard for SystemClipboard {
    fn put(&mut self, data: Vec<u8>) {
        let text = match String::from_utf8(data) {
            Ok(text) => text,
            Err(e) => {
                log::error!("Refusing non-text clipboard data: {}", e);
                return;
            }
        };
        match arboard::Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(text) {
                    log::error!("Failed to copy cards to clipboard: {}", e);
                }
            }
            Err(e) => log::error!("Failed to access clipboard: {}", e),
        }
    }

    fn get(&mut self) -> Option<Vec<u8>> {
        match arboard::Clipboard::new() {
            Ok(mut clipboard) => clipboard.get_text().ok().map(String::into_bytes),
            Err(e) => {
                log::error!("Failed to access clipboard: {}", e);
                None
            }
        }
    }
}
