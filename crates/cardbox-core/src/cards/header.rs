//! Header card: a single line of text used to label regions of a deck.

use super::{CardBase, CardChange, CardField, CardId, CardKind, CardTrait};
use kurbo::Rect;

#[derive(Debug)]
pub struct Header {
    base: CardBase,
    header: String,
}

impl Header {
    pub fn new(id: CardId, rect: Rect) -> Self {
        Self {
            base: CardBase::new(id, rect),
            header: String::new(),
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    /// Set the label. Line breaks are folded into spaces.
    pub fn set_header(&mut self, header: impl Into<String>) {
        let header: String = header.into();
        self.header = header.replace(['\r', '\n'], " ");
        self.base.notify(CardField::Header, CardChange::Header(self.header.clone()));
    }
}

impl CardTrait for Header {
    fn base(&self) -> &CardBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CardBase {
        &mut self.base
    }

    fn kind(&self) -> CardKind {
        CardKind::Header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_is_single_line() {
        let mut h = Header::new(1, Rect::new(0.0, 0.0, 150.0, 32.0));
        h.set_header("first\nsecond");
        assert_eq!(h.header(), "first second");
    }
}
