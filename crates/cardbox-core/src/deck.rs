//! Decks: ordered card collections with groups and free-hand annotation.

use crate::cards::{Card, CardField, CardId, CardKind, CardNotification, SerializableColor};
use crate::dump::{CardDump, DeckDump, GroupDump, LoadError};
use crate::geometry::{intersects, scale_point, scale_rect, union_all};
use crate::group::{CardGroup, GroupId};
use crate::reactive::{Notification, Observers, SubscriptionId};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by deck edits.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeckError {
    #[error("Card not found: {0}")]
    CardNotFound(CardId),
    #[error("Duplicate card id: {0}")]
    DuplicateId(CardId),
}

/// One free-hand stroke, in absolute deck coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub colour: SerializableColor,
    pub thickness: u32,
    pub points: Vec<Point>,
}

impl Line {
    pub fn new(colour: SerializableColor, thickness: u32) -> Self {
        Self {
            colour,
            thickness,
            points: Vec::new(),
        }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Copy with every point multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            colour: self.colour,
            thickness: self.thickness,
            points: self.points.iter().map(|&p| scale_point(p, factor)).collect(),
        }
    }
}

/// Observable deck fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeckField {
    Name,
    Cards,
    Groups,
    Annotation,
}

/// New value carried by a deck notification.
#[derive(Debug, Clone, PartialEq)]
pub enum DeckChange {
    Name(String),
    /// Card ids in z-order.
    Cards(Vec<CardId>),
    Groups(Vec<GroupId>),
    /// Number of strokes.
    Annotation(usize),
}

pub type DeckObservers = Observers<DeckField, DeckChange>;
pub type DeckNotification<'a> = Notification<'a, DeckField, DeckChange>;

/// An ordered collection of cards and groups.
///
/// Card order is z-order (back to front) and tab order. Ids are not
/// necessarily sorted.
#[derive(Debug)]
pub struct Deck {
    id: String,
    name: String,
    cards: Vec<Card>,
    groups: Vec<CardGroup>,
    annotation: Vec<Line>,
    observers: DeckObservers,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl Deck {
    /// Create an empty deck with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        let id = Uuid::new_v4().to_string();
        Self {
            observers: Observers::new(format!("deck.{id}")),
            id,
            name: name.into(),
            cards: Vec::new(),
            groups: Vec::new(),
            annotation: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.observers.notify(DeckField::Name, &DeckChange::Name(self.name.clone()));
    }

    pub fn subscribe(
        &mut self,
        field: DeckField,
        callback: impl FnMut(&DeckNotification<'_>) + 'static,
    ) -> SubscriptionId {
        self.observers.subscribe(field, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Run `f` with deck notifications suppressed.
    pub fn silently<R>(&mut self, f: impl FnOnce(&mut Deck) -> R) -> R {
        let was = self.observers.set_muted(true);
        let result = f(self);
        self.observers.set_muted(was);
        result
    }

    fn notify_cards(&mut self) {
        let ids = self.card_ids();
        self.observers.notify(DeckField::Cards, &DeckChange::Cards(ids));
    }

    fn notify_groups(&mut self) {
        let ids = self.groups.iter().map(|g| g.id).collect();
        self.observers.notify(DeckField::Groups, &DeckChange::Groups(ids));
    }

    fn notify_annotation(&mut self) {
        let count = self.annotation.len();
        self.observers.notify(DeckField::Annotation, &DeckChange::Annotation(count));
    }

    // --- cards -----------------------------------------------------------

    /// Cards in z-order (back to front).
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card_ids(&self) -> Vec<CardId> {
        self.cards.iter().map(Card::id).collect()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.index_of(id).is_some()
    }

    fn index_of(&self, id: CardId) -> Option<usize> {
        self.cards.iter().position(|c| c.id() == id)
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id() == id)
    }

    pub fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id() == id)
    }

    /// Next free card ordinal.
    pub fn next_card_id(&self) -> CardId {
        self.cards.iter().map(Card::id).max().map_or(1, |m| m + 1)
    }

    /// Append a card built elsewhere. Its id must be unused.
    pub fn add_card(&mut self, card: Card) -> Result<CardId, DeckError> {
        let id = card.id();
        if self.contains(id) {
            return Err(DeckError::DuplicateId(id));
        }
        self.cards.push(card);
        self.notify_cards();
        Ok(id)
    }

    /// Create and append an empty card with the next free id.
    pub fn new_card(&mut self, kind: CardKind, rect: Rect) -> CardId {
        let id = self.next_card_id();
        self.cards.push(Card::new(kind, id, rect));
        self.notify_cards();
        id
    }

    /// Remove a card and prune it from every group.
    pub fn remove_card(&mut self, id: CardId) -> Option<Card> {
        let mut removed = self.remove_cards(&[id]);
        removed.pop()
    }

    /// Remove several cards with a single notification per field.
    pub fn remove_cards(&mut self, ids: &[CardId]) -> Vec<Card> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.cards.len());
        for card in self.cards.drain(..) {
            if ids.contains(&card.id()) {
                removed.push(card);
            } else {
                kept.push(card);
            }
        }
        self.cards = kept;
        if removed.is_empty() {
            return removed;
        }

        let mut groups_changed = false;
        for group in &mut self.groups {
            for card in &removed {
                groups_changed |= group.remove(card.id());
            }
        }
        self.notify_cards();
        if groups_changed {
            self.notify_groups();
        }
        removed
    }

    /// Give a card a new id, updating group membership.
    pub fn reassign_id(&mut self, old: CardId, new: CardId) -> Result<(), DeckError> {
        if old == new {
            return if self.contains(old) { Ok(()) } else { Err(DeckError::CardNotFound(old)) };
        }
        if self.contains(new) {
            return Err(DeckError::DuplicateId(new));
        }
        let card = self.card_mut(old).ok_or(DeckError::CardNotFound(old))?;
        card.set_id(new);
        for group in &mut self.groups {
            group.rename(old, new);
        }
        self.notify_cards();
        Ok(())
    }

    /// Bring a card to the front. Returns false if absent or already there.
    pub fn raise_card(&mut self, id: CardId) -> bool {
        match self.index_of(id) {
            Some(i) if i + 1 < self.cards.len() => {
                let card = self.cards.remove(i);
                self.cards.push(card);
                self.notify_cards();
                true
            }
            _ => false,
        }
    }

    /// Send a card to the back. Returns false if absent or already there.
    pub fn lower_card(&mut self, id: CardId) -> bool {
        match self.index_of(id) {
            Some(i) if i > 0 => {
                let card = self.cards.remove(i);
                self.cards.insert(0, card);
                self.notify_cards();
                true
            }
            _ => false,
        }
    }

    /// Union of every card's rect.
    pub fn bounds(&self) -> Option<Rect> {
        union_all(self.cards.iter().map(Card::rect))
    }

    /// Ids of cards whose footprint overlaps `rect` with positive area.
    pub fn cards_in_rect(&self, rect: Rect, scale: f64) -> Vec<CardId> {
        self.cards
            .iter()
            .filter(|c| intersects(c.footprint(scale), rect))
            .map(Card::id)
            .collect()
    }

    /// Top-most card whose footprint contains `point`.
    pub fn card_at(&self, point: Point, scale: f64) -> Option<CardId> {
        self.cards
            .iter()
            .rev()
            .find(|c| crate::geometry::contains_point(c.footprint(scale), point))
            .map(Card::id)
    }

    /// Subscribe to one field of one card. Returns `None` if the card is absent.
    pub fn subscribe_card(
        &mut self,
        id: CardId,
        field: CardField,
        callback: impl FnMut(&CardNotification<'_>) + 'static,
    ) -> Option<SubscriptionId> {
        self.card_mut(id).map(|c| c.subscribe(field, callback))
    }

    // --- groups ----------------------------------------------------------

    pub fn groups(&self) -> &[CardGroup] {
        &self.groups
    }

    pub fn group(&self, id: GroupId) -> Option<&CardGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn next_group_id(&self) -> GroupId {
        self.groups.iter().map(|g| g.id).max().map_or(1, |m| m + 1)
    }

    /// Create a group from card ids. Ids need not resolve.
    pub fn add_group(&mut self, members: impl IntoIterator<Item = CardId>) -> GroupId {
        let id = self.next_group_id();
        self.groups.push(CardGroup::new(id, members));
        self.notify_groups();
        id
    }

    pub fn remove_group(&mut self, id: GroupId) -> Option<CardGroup> {
        let index = self.groups.iter().position(|g| g.id == id)?;
        let group = self.groups.remove(index);
        self.notify_groups();
        Some(group)
    }

    /// Groups that list `card` as a member, in deck order.
    pub fn groups_containing(&self, card: CardId) -> Vec<GroupId> {
        self.groups.iter().filter(|g| g.contains(card)).map(|g| g.id).collect()
    }

    /// Members of a group that resolve to cards in this deck.
    pub fn resolve_group(&self, id: GroupId) -> Vec<CardId> {
        let Some(group) = self.group(id) else {
            return Vec::new();
        };
        group
            .members()
            .iter()
            .copied()
            .filter(|&m| {
                let found = self.contains(m);
                if !found {
                    log::debug!("group {id}: skipping missing member {m}");
                }
                found
            })
            .collect()
    }

    // --- annotation ------------------------------------------------------

    pub fn annotation(&self) -> &[Line] {
        &self.annotation
    }

    pub fn annotate(&mut self, line: Line) {
        self.annotation.push(line);
        self.notify_annotation();
    }

    pub fn clear_annotation(&mut self) {
        if self.annotation.is_empty() {
            return;
        }
        self.annotation.clear();
        self.notify_annotation();
    }

    /// Multiply every card rect and annotation point by `factor`.
    pub(crate) fn scale_geometry(&mut self, factor: f64) {
        for card in &mut self.cards {
            let rect = scale_rect(card.rect(), factor);
            card.set_rect(rect);
        }
        for line in &mut self.annotation {
            *line = line.scaled(factor);
        }
        if !self.annotation.is_empty() {
            self.notify_annotation();
        }
    }

    // --- persistence -----------------------------------------------------

    /// Dump at scale 1.
    pub fn dump(&self) -> DeckDump {
        self.dump_with_scale(1.0)
    }

    /// Dump with `scale` divided out of all geometry.
    pub fn dump_with_scale(&self, scale: f64) -> DeckDump {
        DeckDump {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            cards: self.cards.iter().map(|c| (c.id(), CardDump::from_card(c, scale))).collect(),
            groups: self
                .groups
                .iter()
                .map(|g| {
                    (
                        g.id,
                        GroupDump {
                            name: g.name.clone(),
                            members: g.members().to_vec(),
                        },
                    )
                })
                .collect(),
            order: Some(self.card_ids()),
            annotation: self.annotation.iter().map(|l| l.scaled(1.0 / scale)).collect(),
        }
    }

    /// Build a new deck from a dump. All cards are created before any group
    /// is resolved; dangling group members are dropped.
    pub fn from_dump(dump: &DeckDump) -> Result<Deck, LoadError> {
        let mut deck = match &dump.id {
            Some(id) if !id.is_empty() => Deck {
                observers: Observers::new(format!("deck.{id}")),
                id: id.clone(),
                name: dump.name.clone(),
                cards: Vec::new(),
                groups: Vec::new(),
                annotation: Vec::new(),
            },
            _ => Deck::new(dump.name.clone()),
        };

        for id in dump.ordered_ids() {
            if let Some(card) = dump.cards.get(&id) {
                deck.cards.push(card.to_card(id, 1.0)?);
            }
        }

        for (&gid, group) in &dump.groups {
            let members = group.members.iter().copied().filter(|&m| {
                let found = deck.contains(m);
                if !found {
                    log::warn!("group {gid} references missing card {m}, skipping");
                }
                found
            });
            let mut g = CardGroup::new(gid, members.collect::<Vec<_>>());
            g.name = group.name.clone();
            deck.groups.push(g);
        }

        deck.annotation = dump.annotation.clone();
        log::debug!(
            "loaded deck {} with {} cards and {} groups",
            deck.name,
            deck.cards.len(),
            deck.groups.len()
        );
        Ok(deck)
    }

    /// Replace this deck's contents with a dump. On error the deck is left
    /// exactly as it was.
    pub fn load(&mut self, dump: &DeckDump) -> Result<(), LoadError> {
        let scratch = Deck::from_dump(dump)?;
        self.restore(scratch);
        Ok(())
    }

    /// Take over another deck's data, keeping this deck's subscribers.
    pub fn restore(&mut self, other: Deck) {
        let Deck {
            id,
            name,
            cards,
            groups,
            annotation,
            observers: _,
        } = other;
        self.id = id;
        self.observers.retopic(format!("deck.{}", self.id));
        self.name = name;
        self.cards = cards;
        self.groups = groups;
        self.annotation = annotation;

        self.observers.notify(DeckField::Name, &DeckChange::Name(self.name.clone()));
        self.notify_cards();
        self.notify_groups();
        self.notify_annotation();
    }
}
