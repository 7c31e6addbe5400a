//! Card definitions for the board.

mod content;
mod header;
mod image;

pub use content::{Content, ContentKind, RATING_MAX};
pub use header::Header;
pub use image::Image;

use crate::reactive::{Notification, Observers, SubscriptionId};
use kurbo::{Point, Rect, Size};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unique identifier for cards within one deck.
pub type CardId = u32;

/// Errors raised by card construction and parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CardError {
    #[error("Invalid card kind: {0}")]
    InvalidKind(String),
}

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// The closed set of card variants. Doubles as the `"class"` discriminator
/// in dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    Content,
    Header,
    Image,
}

impl CardKind {
    pub fn name(self) -> &'static str {
        match self {
            CardKind::Content => "Content",
            CardKind::Header => "Header",
            CardKind::Image => "Image",
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CardKind {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Content" => Ok(CardKind::Content),
            "Header" => Ok(CardKind::Header),
            "Image" => Ok(CardKind::Image),
            other => Err(CardError::InvalidKind(other.to_string())),
        }
    }
}

/// Observable card fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardField {
    Id,
    Rect,
    Title,
    Kind,
    Rating,
    Content,
    Collapsed,
    Header,
    Path,
    Scale,
}

/// New value carried by a card notification.
#[derive(Debug, Clone, PartialEq)]
pub enum CardChange {
    Id(CardId),
    Rect(Rect),
    Title(String),
    Kind(ContentKind),
    Rating(u8),
    Content(String),
    Collapsed(bool),
    Header(String),
    Path(String),
    Scale(f64),
}

/// Subscriber registry type for cards.
pub type CardObservers = Observers<CardField, CardChange>;

/// Notification delivered to card subscribers.
pub type CardNotification<'a> = Notification<'a, CardField, CardChange>;

fn card_topic(id: CardId) -> String {
    format!("card.{id}")
}

/// State shared by every card variant.
#[derive(Debug)]
pub struct CardBase {
    id: CardId,
    rect: Rect,
    observers: CardObservers,
}

impl CardBase {
    pub fn new(id: CardId, rect: Rect) -> Self {
        Self {
            id,
            rect: rect.abs(),
            observers: Observers::new(card_topic(id)),
        }
    }

    pub(crate) fn notify(&mut self, field: CardField, change: CardChange) {
        self.observers.notify(field, &change);
    }
}

/// Common behaviour of all cards.
///
/// Implementors only provide access to their [`CardBase`]; geometry,
/// identity and subscription handling are shared.
pub trait CardTrait {
    fn base(&self) -> &CardBase;

    fn base_mut(&mut self) -> &mut CardBase;

    fn kind(&self) -> CardKind;

    fn id(&self) -> CardId {
        self.base().id
    }

    /// Reassign the id and re-root the notification channel.
    fn set_id(&mut self, id: CardId) {
        let base = self.base_mut();
        base.id = id;
        base.observers.retopic(card_topic(id));
        base.notify(CardField::Id, CardChange::Id(id));
    }

    /// Position and size as `(left, top, right, bottom)`.
    fn rect(&self) -> Rect {
        self.base().rect
    }

    fn set_rect(&mut self, rect: Rect) {
        let rect = rect.abs();
        let base = self.base_mut();
        base.rect = rect;
        base.notify(CardField::Rect, CardChange::Rect(rect));
    }

    fn position(&self) -> Point {
        self.rect().origin()
    }

    fn set_position(&mut self, position: Point) {
        let size = self.rect().size();
        self.set_rect(Rect::from_origin_size(position, size));
    }

    fn size(&self) -> Size {
        self.rect().size()
    }

    fn set_size(&mut self, size: Size) {
        let origin = self.rect().origin();
        let size = Size::new(size.width.max(0.0), size.height.max(0.0));
        self.set_rect(Rect::from_origin_size(origin, size));
    }

    fn topic(&self) -> &str {
        self.base().observers.topic()
    }

    fn subscribe(
        &mut self,
        field: CardField,
        callback: impl FnMut(&CardNotification<'_>) + 'static,
    ) -> SubscriptionId
    where
        Self: Sized,
    {
        self.base_mut().observers.subscribe(field, callback)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.base_mut().observers.unsubscribe(id)
    }
}

/// Enum wrapper for all card types.
#[derive(Debug)]
pub enum Card {
    Content(Content),
    Header(Header),
    Image(Image),
}

impl Card {
    /// Construct an empty card of the given kind.
    pub fn new(kind: CardKind, id: CardId, rect: Rect) -> Self {
        match kind {
            CardKind::Content => Card::Content(Content::new(id, rect)),
            CardKind::Header => Card::Header(Header::new(id, rect)),
            CardKind::Image => Card::Image(Image::new(id, rect)),
        }
    }

    fn inner(&self) -> &dyn CardTrait {
        match self {
            Card::Content(c) => c,
            Card::Header(c) => c,
            Card::Image(c) => c,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn CardTrait {
        match self {
            Card::Content(c) => c,
            Card::Header(c) => c,
            Card::Image(c) => c,
        }
    }

    pub fn kind(&self) -> CardKind {
        self.inner().kind()
    }

    pub fn id(&self) -> CardId {
        self.inner().id()
    }

    pub(crate) fn set_id(&mut self, id: CardId) {
        self.inner_mut().set_id(id);
    }

    pub fn rect(&self) -> Rect {
        self.inner().rect()
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.inner_mut().set_rect(rect);
    }

    pub fn position(&self) -> Point {
        self.inner().position()
    }

    pub fn set_position(&mut self, position: Point) {
        self.inner_mut().set_position(position);
    }

    pub fn size(&self) -> Size {
        self.inner().size()
    }

    pub fn set_size(&mut self, size: Size) {
        self.inner_mut().set_size(size);
    }

    pub fn topic(&self) -> &str {
        self.inner().topic()
    }

    /// Register a callback for one of this card's fields.
    pub fn subscribe(
        &mut self,
        field: CardField,
        callback: impl FnMut(&CardNotification<'_>) + 'static,
    ) -> SubscriptionId {
        self.inner_mut().base_mut().observers.subscribe(field, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.inner_mut().unsubscribe(id)
    }

    /// Run `f` with notifications suppressed, for two-way bound controls.
    pub fn silently<R>(&mut self, f: impl FnOnce(&mut Card) -> R) -> R {
        let was = self.inner_mut().base_mut().observers.set_muted(true);
        let result = f(self);
        self.inner_mut().base_mut().observers.set_muted(was);
        result
    }

    /// The area the card occupies on the board. Collapsed content cards
    /// only take their title strip.
    pub fn footprint(&self, scale: f64) -> Rect {
        match self {
            Card::Content(c) => c.footprint(scale),
            _ => self.rect(),
        }
    }

    /// Background and foreground colours used by the card's view.
    pub fn colours(&self) -> (Color, Color) {
        match self {
            Card::Content(c) => {
                let (bg, fg) = c.content_kind().colours();
                (bg.into(), fg.into())
            }
            Card::Header(_) => (SerializableColor::white().into(), SerializableColor::black().into()),
            Card::Image(_) => (SerializableColor::white().into(), SerializableColor::black().into()),
        }
    }

    pub fn as_content(&self) -> Option<&Content> {
        match self {
            Card::Content(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_content_mut(&mut self) -> Option<&mut Content> {
        match self {
            Card::Content(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_header(&self) -> Option<&Header> {
        match self {
            Card::Header(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_header_mut(&mut self) -> Option<&mut Header> {
        match self {
            Card::Header(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Card::Image(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut Image> {
        match self {
            Card::Image(i) => Some(i),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_card_kind_parse() {
        assert_eq!("Header".parse::<CardKind>(), Ok(CardKind::Header));
        assert_eq!(
            "Sticky".parse::<CardKind>(),
            Err(CardError::InvalidKind("Sticky".to_string()))
        );
    }

    #[test]
    fn test_rect_is_normalized() {
        let card = Card::new(CardKind::Header, 1, Rect::new(100.0, 100.0, 50.0, 80.0));
        let r = card.rect();
        assert!(r.width() >= 0.0 && r.height() >= 0.0);
        assert_eq!(r.origin(), Point::new(50.0, 80.0));
    }

    #[test]
    fn test_set_position_notifies_rect() {
        let mut card = Card::new(CardKind::Content, 1, Rect::new(0.0, 0.0, 250.0, 150.0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        card.subscribe(CardField::Rect, move |n| {
            if let CardChange::Rect(r) = n.value {
                sink.borrow_mut().push(*r);
            }
        });

        card.set_position(Point::new(10.0, 20.0));

        assert_eq!(*seen.borrow(), vec![Rect::new(10.0, 20.0, 260.0, 170.0)]);
    }

    #[test]
    fn test_silently_does_not_notify() {
        let mut card = Card::new(CardKind::Header, 1, Rect::new(0.0, 0.0, 150.0, 32.0));
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        card.subscribe(CardField::Rect, move |_| *c.borrow_mut() += 1);

        card.silently(|c| c.set_position(Point::new(5.0, 5.0)));

        assert_eq!(*count.borrow(), 0);
        assert_eq!(card.position(), Point::new(5.0, 5.0));
    }

    #[test]
    fn test_id_change_reroots_topic() {
        let mut card = Card::new(CardKind::Header, 1, Rect::new(0.0, 0.0, 150.0, 32.0));
        let topics = Rc::new(RefCell::new(Vec::new()));
        let t = topics.clone();
        card.subscribe(CardField::Rect, move |n| t.borrow_mut().push(n.topic.to_string()));

        card.set_position(Point::new(1.0, 1.0));
        card.set_id(42);
        card.set_position(Point::new(2.0, 2.0));

        assert_eq!(card.topic(), "card.42");
        assert_eq!(*topics.borrow(), vec!["card.1".to_string(), "card.42".to_string()]);
    }
}
