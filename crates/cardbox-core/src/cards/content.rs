//! Content card: the main note card with a title and a body.

use super::{CardBase, CardChange, CardError, CardField, CardId, CardKind, CardTrait, SerializableColor};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest rating a content card can carry.
pub const RATING_MAX: u8 = 3;

/// Semantic kind of a content card. Each kind has a fixed colour pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContentKind {
    Concept,
    Research,
    Assumption,
    Fact,
    #[default]
    None,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        ContentKind::Concept,
        ContentKind::Research,
        ContentKind::Assumption,
        ContentKind::Fact,
        ContentKind::None,
    ];

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            ContentKind::Concept => "Concept",
            ContentKind::Research => "Research",
            ContentKind::Assumption => "Assumption",
            ContentKind::Fact => "Fact",
            ContentKind::None => "kind",
        }
    }

    /// `(background, foreground)` colours.
    pub fn colours(self) -> (SerializableColor, SerializableColor) {
        match self {
            ContentKind::Concept => (SerializableColor::rgb(237, 242, 170), SerializableColor::rgb(73, 73, 23)),
            ContentKind::Research => (SerializableColor::rgb(190, 227, 242), SerializableColor::rgb(20, 60, 90)),
            ContentKind::Assumption => (SerializableColor::rgb(242, 196, 186), SerializableColor::rgb(110, 30, 20)),
            ContentKind::Fact => (SerializableColor::rgb(198, 237, 192), SerializableColor::rgb(30, 85, 30)),
            ContentKind::None => (SerializableColor::white(), SerializableColor::black()),
        }
    }

    /// Cycle to the next kind.
    pub fn next(self) -> Self {
        match self {
            ContentKind::Concept => ContentKind::Research,
            ContentKind::Research => ContentKind::Assumption,
            ContentKind::Assumption => ContentKind::Fact,
            ContentKind::Fact => ContentKind::None,
            ContentKind::None => ContentKind::Concept,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContentKind {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentKind::ALL
            .into_iter()
            .find(|k| k.label().eq_ignore_ascii_case(s))
            .or_else(|| (s.is_empty() || s.eq_ignore_ascii_case("none")).then_some(ContentKind::None))
            .ok_or_else(|| CardError::InvalidKind(s.to_string()))
    }
}

/// A note card with title, kind, rating and body text.
#[derive(Debug)]
pub struct Content {
    base: CardBase,
    title: String,
    kind: ContentKind,
    rating: u8,
    content: String,
    collapsed: bool,
}

impl Content {
    /// Height of the title strip a collapsed card keeps, at scale 1.
    pub const COLLAPSED_HEIGHT: f64 = 32.0;

    pub fn new(id: CardId, rect: Rect) -> Self {
        Self {
            base: CardBase::new(id, rect),
            title: String::new(),
            kind: ContentKind::None,
            rating: 0,
            content: String::new(),
            collapsed: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.base.notify(CardField::Title, CardChange::Title(self.title.clone()));
    }

    pub fn content_kind(&self) -> ContentKind {
        self.kind
    }

    pub fn set_content_kind(&mut self, kind: ContentKind) {
        self.kind = kind;
        self.base.notify(CardField::Kind, CardChange::Kind(kind));
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    /// Set the rating, clamped to `0..=RATING_MAX`.
    pub fn set_rating(&mut self, rating: u8) {
        self.rating = rating.min(RATING_MAX);
        self.base.notify(CardField::Rating, CardChange::Rating(self.rating));
    }

    /// Increase the rating by one. Past the maximum it wraps to zero when
    /// `wrap` is set and stays at the maximum otherwise.
    pub fn increase_rating(&mut self, wrap: bool) {
        let next = if self.rating < RATING_MAX {
            self.rating + 1
        } else if wrap {
            0
        } else {
            RATING_MAX
        };
        self.set_rating(next);
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.base.notify(CardField::Content, CardChange::Content(self.content.clone()));
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
        self.base.notify(CardField::Collapsed, CardChange::Collapsed(collapsed));
    }

    pub fn toggle_collapsed(&mut self) {
        self.set_collapsed(!self.collapsed);
    }

    /// Occupied area; only the title strip while collapsed.
    pub fn footprint(&self, scale: f64) -> Rect {
        let rect = self.base.rect;
        if self.collapsed {
            let height = rect.height().min(Self::COLLAPSED_HEIGHT * scale);
            Rect::new(rect.x0, rect.y0, rect.x1, rect.y0 + height)
        } else {
            rect
        }
    }
}

impl CardTrait for Content {
    fn base(&self) -> &CardBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CardBase {
        &mut self.base
    }

    fn kind(&self) -> CardKind {
        CardKind::Content
    }
}
