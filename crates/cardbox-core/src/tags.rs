//! `key: value` tag lines embedded in content cards, and an index over them.

use crate::cards::{CardField, CardId};
use crate::deck::{Deck, DeckField};
use crate::reactive::SubscriptionId;
use regex::Regex;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;
use std::sync::LazyLock;

static TAG_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\w+):(.*)$").expect("valid tag pattern"));

/// One tag line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// Pull every tag line out of a card body. Values are trimmed.
pub fn extract_tags(text: &str) -> Vec<Tag> {
    text.lines()
        .filter_map(|line| TAG_LINE.captures(line.trim_end_matches('\r')))
        .map(|caps| Tag {
            key: caps[1].to_string(),
            value: caps[2].trim().to_string(),
        })
        .collect()
}

/// Tag key to card ids, kept current through card and deck subscriptions.
///
/// Edits only mark cards dirty; the index catches up on the next
/// [`TagIndex::sync`].
#[derive(Debug, Default)]
pub struct TagIndex {
    entries: BTreeMap<String, Vec<CardId>>,
    dirty: Rc<RefCell<BTreeSet<CardId>>>,
    rescan: Rc<Cell<bool>>,
    deck_subscription: Option<SubscriptionId>,
    subscriptions: HashMap<CardId, SubscriptionId>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the index up to date with `deck`, subscribing on first use.
    pub fn sync(&mut self, deck: &mut Deck) {
        if self.deck_subscription.is_none() {
            let rescan = self.rescan.clone();
            self.deck_subscription = Some(deck.subscribe(DeckField::Cards, move |_| rescan.set(true)));
            self.rescan.set(true);
        }

        if self.rescan.replace(false) {
            self.resubscribe(deck);
            self.entries.clear();
            self.dirty.borrow_mut().clear();
            for card in deck.cards() {
                if let Some(content) = card.as_content() {
                    self.insert(card.id(), content.content());
                }
            }
            log::debug!("tag index rebuilt: {} keys", self.entries.len());
            return;
        }

        let dirty = std::mem::take(&mut *self.dirty.borrow_mut());
        for id in dirty {
            for ids in self.entries.values_mut() {
                ids.retain(|&c| c != id);
            }
            if let Some(content) = deck.card(id).and_then(|c| c.as_content()) {
                self.insert(id, content.content());
            }
        }
        self.entries.retain(|_, ids| !ids.is_empty());
    }

    fn resubscribe(&mut self, deck: &mut Deck) {
        for (id, sub) in self.subscriptions.drain() {
            if let Some(card) = deck.card_mut(id) {
                card.unsubscribe(sub);
            }
        }
        for id in deck.card_ids() {
            let dirty = self.dirty.clone();
            let is_content = deck.card(id).is_some_and(|c| c.as_content().is_some());
            if !is_content {
                continue;
            }
            let sub = deck.subscribe_card(id, CardField::Content, move |_| {
                dirty.borrow_mut().insert(id);
            });
            if let Some(sub) = sub {
                self.subscriptions.insert(id, sub);
            }
        }
    }

    fn insert(&mut self, id: CardId, text: &str) {
        for tag in extract_tags(text) {
            let ids = self.entries.entry(tag.key).or_default();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }

    /// Stop listening to `deck`. The index keeps its last contents.
    pub fn detach(&mut self, deck: &mut Deck) {
        if let Some(sub) = self.deck_subscription.take() {
            deck.unsubscribe(sub);
        }
        for (id, sub) in self.subscriptions.drain() {
            if let Some(card) = deck.card_mut(id) {
                card.unsubscribe(sub);
            }
        }
    }

    /// Cards carrying a tag line with `key`.
    pub fn cards_with(&self, key: &str) -> &[CardId] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Known keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, CardKind};
    use kurbo::Rect;

    fn content_card(deck: &mut Deck, text: &str) -> CardId {
        let id = deck.new_card(CardKind::Content, Rect::new(0.0, 0.0, 250.0, 150.0));
        if let Some(c) = deck.card_mut(id).and_then(Card::as_content_mut) {
            c.set_content(text);
        }
        id
    }

    #[test]
    fn test_extract_tags() {
        let tags = extract_tags("intro line\nsource: Smith 2004\nnot a tag: spaces\nyear:1999\r\n:empty");
        assert_eq!(
            tags,
            vec![
                Tag {
                    key: "source".into(),
                    value: "Smith 2004".into()
                },
                Tag {
                    key: "year".into(),
                    value: "1999".into()
                },
            ]
        );
    }

    #[test]
    fn test_index_tracks_edits() {
        let mut deck = Deck::new("d");
        let a = content_card(&mut deck, "source: a");
        let b = content_card(&mut deck, "source: b\nyear: 2000");

        let mut index = TagIndex::new();
        index.sync(&mut deck);
        assert_eq!(index.cards_with("source"), &[a, b]);
        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["source", "year"]);

        if let Some(c) = deck.card_mut(b).and_then(Card::as_content_mut) {
            c.set_content("nothing here");
        }
        index.sync(&mut deck);
        assert_eq!(index.cards_with("source"), &[a]);
        assert!(index.cards_with("year").is_empty());
    }

    #[test]
    fn test_index_follows_new_and_removed_cards() {
        let mut deck = Deck::new("d");
        let a = content_card(&mut deck, "topic: x");
        let mut index = TagIndex::new();
        index.sync(&mut deck);

        let b = content_card(&mut deck, "topic: y");
        index.sync(&mut deck);
        assert_eq!(index.cards_with("topic"), &[a, b]);

        deck.remove_card(a);
        index.sync(&mut deck);
        assert_eq!(index.cards_with("topic"), &[b]);

        // edits to the new card are tracked too
        if let Some(c) = deck.card_mut(b).and_then(Card::as_content_mut) {
            c.set_content("other: z");
        }
        index.sync(&mut deck);
        assert!(index.cards_with("topic").is_empty());
        assert_eq!(index.cards_with("other"), &[b]);
    }

    #[test]
    fn test_detach() {
        let mut deck = Deck::new("d");
        let a = content_card(&mut deck, "k: v");
        let mut index = TagIndex::new();
        index.sync(&mut deck);
        index.detach(&mut deck);

        if let Some(c) = deck.card_mut(a).and_then(Card::as_content_mut) {
            c.set_content("");
        }
        assert!(index.dirty.borrow().is_empty());
        assert_eq!(index.cards_with("k"), &[a]);
    }
}
