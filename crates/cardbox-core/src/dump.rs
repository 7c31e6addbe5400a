//! Plain serializable mirrors of the model, used for files and the clipboard.
//!
//! Geometry in a dump is always unscaled. A box file looks like:
//!
//! ```json
//! { "version": 1, "name": "notes", "decks": [
//!     { "id": "…", "name": "ideas",
//!       "cards": { "1": { "class": "Content", "rect": [15, 15, 250, 150], "title": "…" } },
//!       "groups": { "1": { "members": [1] } },
//!       "order": [1] } ] }
//! ```

use crate::cards::{Card, CardError, CardId, CardKind, ContentKind, RATING_MAX};
use crate::geometry::{rect_from_ltwh, rect_to_ltwh, scale_rect};
use crate::group::GroupId;
use crate::deck::Line;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Current box file format version. Files without a version are legacy (0).
pub const DUMP_VERSION: u32 = 1;

/// Errors raised while reading a dump.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Corrupt file: {0}")]
    CorruptFile(String),
    #[error("Invalid card kind: {0}")]
    InvalidKind(String),
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::CorruptFile(err.to_string())
    }
}

impl From<CardError> for LoadError {
    fn from(err: CardError) -> Self {
        match err {
            CardError::InvalidKind(kind) => LoadError::InvalidKind(kind),
        }
    }
}

fn default_image_scale() -> f64 {
    1.0
}

/// One card, discriminated by `"class"`. `rect` is `[left, top, width, height]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum CardDump {
    Content {
        rect: [f64; 4],
        #[serde(default)]
        title: String,
        #[serde(default)]
        kind: ContentKind,
        #[serde(default)]
        rating: u8,
        #[serde(default)]
        content: String,
        #[serde(default)]
        collapsed: bool,
    },
    Header {
        rect: [f64; 4],
        #[serde(default)]
        header: String,
    },
    Image {
        rect: [f64; 4],
        #[serde(default)]
        path: String,
        #[serde(default = "default_image_scale")]
        scale: f64,
    },
}

impl CardDump {
    /// Dump a card, dividing `scale` out of its geometry.
    pub fn from_card(card: &Card, scale: f64) -> Self {
        let rect = rect_to_ltwh(scale_rect(card.rect(), 1.0 / scale));
        match card {
            Card::Content(c) => CardDump::Content {
                rect,
                title: c.title().to_string(),
                kind: c.content_kind(),
                rating: c.rating(),
                content: c.content().to_string(),
                collapsed: c.is_collapsed(),
            },
            Card::Header(h) => CardDump::Header {
                rect,
                header: h.header().to_string(),
            },
            Card::Image(i) => CardDump::Image {
                rect,
                path: i.path().to_string(),
                scale: i.scale(),
            },
        }
    }

    pub fn kind(&self) -> CardKind {
        match self {
            CardDump::Content { .. } => CardKind::Content,
            CardDump::Header { .. } => CardKind::Header,
            CardDump::Image { .. } => CardKind::Image,
        }
    }

    fn ltwh(&self) -> [f64; 4] {
        match self {
            CardDump::Content { rect, .. } | CardDump::Header { rect, .. } | CardDump::Image { rect, .. } => *rect,
        }
    }

    /// Unscaled rectangle.
    pub fn rect(&self) -> kurbo::Rect {
        let [l, t, w, h] = self.ltwh();
        rect_from_ltwh(l, t, w, h)
    }

    /// Build a card with the given id, multiplying geometry by `scale`.
    pub fn to_card(&self, id: CardId, scale: f64) -> Result<Card, LoadError> {
        if self.ltwh().iter().any(|v| !v.is_finite()) {
            return Err(LoadError::CorruptFile(format!("card {id} has a non-finite rect")));
        }
        let mut card = Card::new(self.kind(), id, scale_rect(self.rect(), scale));
        match (&mut card, self) {
            (
                Card::Content(c),
                CardDump::Content {
                    title,
                    kind,
                    rating,
                    content,
                    collapsed,
                    ..
                },
            ) => {
                c.set_title(title.clone());
                c.set_content_kind(*kind);
                c.set_rating((*rating).min(RATING_MAX));
                c.set_content(content.clone());
                c.set_collapsed(*collapsed);
            }
            (Card::Header(h), CardDump::Header { header, .. }) => h.set_header(header.clone()),
            (Card::Image(i), CardDump::Image { path, scale, .. }) => {
                i.set_path(path.clone());
                i.set_scale(*scale);
            }
            _ => return Err(LoadError::InvalidKind(self.kind().to_string())),
        }
        Ok(card)
    }
}

/// One group. The map key carries its id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupDump {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub members: Vec<CardId>,
}

/// One deck.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeckDump {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub cards: BTreeMap<CardId, CardDump>,
    #[serde(default)]
    pub groups: BTreeMap<GroupId, GroupDump>,
    /// Card ids back to front. Absent in legacy files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<CardId>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotation: Vec<Line>,
}

impl DeckDump {
    /// Card ids in z-order: the recorded order first, then anything it
    /// missed in ascending id order. Unknown and repeated ids are dropped.
    pub fn ordered_ids(&self) -> Vec<CardId> {
        let mut ids: Vec<CardId> = Vec::with_capacity(self.cards.len());
        for &id in self.order.iter().flatten() {
            if self.cards.contains_key(&id) && !ids.contains(&id) {
                ids.push(id);
            }
        }
        for &id in self.cards.keys() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self, LoadError> {
        check_deck(&value)?;
        Ok(serde_json::from_value(value)?)
    }
}

/// A whole box: the unit of one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxDump {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub name: String,
    pub decks: Vec<DeckDump>,
}

impl BoxDump {
    pub fn new(name: impl Into<String>, decks: Vec<DeckDump>) -> Self {
        Self {
            version: DUMP_VERSION,
            name: name.into(),
            decks,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a box file. A bare deck mapping is read as a one-deck box.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let value: Value = serde_json::from_str(json)?;
        let Some(object) = value.as_object() else {
            return Err(LoadError::CorruptFile("expected a mapping at top level".to_string()));
        };

        if object.contains_key("cards") && !object.contains_key("decks") {
            log::info!("reading legacy single-deck file");
            let deck = DeckDump::from_value(value)?;
            return Ok(Self {
                version: 0,
                name: deck.name.clone(),
                decks: vec![deck],
            });
        }

        let Some(decks) = object.get("decks").and_then(Value::as_array) else {
            return Err(LoadError::CorruptFile("missing \"decks\"".to_string()));
        };
        for deck in decks {
            check_deck(deck)?;
        }

        let dump: BoxDump = serde_json::from_value(value)?;
        if dump.version > DUMP_VERSION {
            return Err(LoadError::CorruptFile(format!(
                "unsupported version {} (newest known is {DUMP_VERSION})",
                dump.version
            )));
        }
        Ok(dump)
    }
}

/// Validate the shape of a deck mapping and every card's `"class"` before
/// handing it to serde, so unknown classes surface as `InvalidKind`.
fn check_deck(value: &Value) -> Result<(), LoadError> {
    let Some(cards) = value.get("cards").and_then(Value::as_object) else {
        return Err(LoadError::CorruptFile("deck without \"cards\"".to_string()));
    };
    for (key, card) in cards {
        match card.get("class").and_then(Value::as_str) {
            Some(class) => {
                class.parse::<CardKind>()?;
            }
            None => return Err(LoadError::CorruptFile(format!("card {key} has no \"class\""))),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    #[test]
    fn test_card_dump_is_unscaled() {
        let mut card = Card::new(CardKind::Content, 1, Rect::new(30.0, 30.0, 530.0, 330.0));
        if let Some(c) = card.as_content_mut() {
            c.set_title("Hello");
        }
        let dump = CardDump::from_card(&card, 2.0);
        assert_eq!(dump.rect(), Rect::new(15.0, 15.0, 265.0, 165.0));

        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["class"], "Content");
        assert_eq!(json["title"], "Hello");
    }

    #[test]
    fn test_unknown_class_is_invalid_kind() {
        let json = r#"{"cards": {"1": {"class": "Sticky", "rect": [0, 0, 10, 10]}}}"#;
        assert_eq!(
            DeckDump::from_json(json),
            Err(LoadError::InvalidKind("Sticky".to_string()))
        );
    }

    #[test]
    fn test_missing_rect_is_corrupt() {
        let json = r#"{"cards": {"1": {"class": "Header"}}}"#;
        assert!(matches!(DeckDump::from_json(json), Err(LoadError::CorruptFile(_))));
    }

    #[test]
    fn test_missing_cards_is_corrupt() {
        assert!(matches!(DeckDump::from_json("{}"), Err(LoadError::CorruptFile(_))));
        assert!(matches!(BoxDump::from_json("[]"), Err(LoadError::CorruptFile(_))));
        assert!(matches!(BoxDump::from_json(r#"{"name": "x"}"#), Err(LoadError::CorruptFile(_))));
    }

    #[test]
    fn test_legacy_deck_reads_as_box() {
        let json = r#"{"name": "old", "cards": {"2": {"class": "Header", "rect": [1, 2, 3, 4], "header": "h"}}}"#;
        let dump = BoxDump::from_json(json).unwrap();
        assert_eq!(dump.version, 0);
        assert_eq!(dump.decks.len(), 1);
        assert_eq!(dump.decks[0].ordered_ids(), vec![2]);
    }

    #[test]
    fn test_unversioned_box_is_legacy() {
        let json = r#"{"name": "b", "decks": []}"#;
        assert_eq!(BoxDump::from_json(json).unwrap().version, 0);
    }

    #[test]
    fn test_future_version_rejected() {
        let json = r#"{"version": 99, "decks": []}"#;
        assert!(matches!(BoxDump::from_json(json), Err(LoadError::CorruptFile(_))));
    }

    #[test]
    fn test_ordered_ids_falls_back_to_ascending() {
        let header = CardDump::Header {
            rect: [0.0, 0.0, 1.0, 1.0],
            header: String::new(),
        };
        let mut dump = DeckDump::default();
        for id in [5, 1, 3] {
            dump.cards.insert(id, header.clone());
        }
        assert_eq!(dump.ordered_ids(), vec![1, 3, 5]);

        dump.order = Some(vec![5, 42, 5, 1]);
        assert_eq!(dump.ordered_ids(), vec![5, 1, 3]);
    }

    #[test]
    fn test_non_finite_rect_rejected() {
        let dump = CardDump::Header {
            rect: [f64::NAN, 0.0, 1.0, 1.0],
            header: String::new(),
        };
        assert!(matches!(dump.to_card(1, 1.0), Err(LoadError::CorruptFile(_))));
    }
}
