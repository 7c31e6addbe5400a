//! Card groups: named sets of card ids with joint selection.

use crate::cards::CardId;
use serde::{Deserialize, Serialize};

/// Unique identifier for groups within one deck.
pub type GroupId = u32;

/// A set of cards that are selected together.
///
/// Members are stored by id, not by reference, so a group survives dumping
/// without pointer resolution. Ids that no longer resolve are skipped by
/// whoever reads the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardGroup {
    pub(crate) id: GroupId,
    pub name: String,
    members: Vec<CardId>,
}

impl CardGroup {
    /// Create a group. Duplicate member ids are dropped, order is kept.
    pub fn new(id: GroupId, members: impl IntoIterator<Item = CardId>) -> Self {
        let mut group = Self {
            id,
            name: String::new(),
            members: Vec::new(),
        };
        for member in members {
            group.add(member);
        }
        group
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn members(&self) -> &[CardId] {
        &self.members
    }

    pub fn contains(&self, card: CardId) -> bool {
        self.members.contains(&card)
    }

    /// Add a member. Returns false if it was already present.
    pub fn add(&mut self, card: CardId) -> bool {
        if self.contains(card) {
            return false;
        }
        self.members.push(card);
        true
    }

    /// Remove a member. Returns false if it was not present.
    pub fn remove(&mut self, card: CardId) -> bool {
        let before = self.members.len();
        self.members.retain(|&m| m != card);
        self.members.len() != before
    }

    /// Rename a member in place.
    pub(crate) fn rename(&mut self, old: CardId, new: CardId) {
        for member in &mut self.members {
            if *member == old {
                *member = new;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_dedups_members() {
        let g = CardGroup::new(1, [3, 1, 3, 2]);
        assert_eq!(g.members(), &[3, 1, 2]);
    }

    #[test]
    fn test_add_remove() {
        let mut g = CardGroup::new(1, []);
        assert!(g.add(5));
        assert!(!g.add(5));
        assert!(g.remove(5));
        assert!(!g.remove(5));
        assert!(g.is_empty());
    }

    #[test]
    fn test_rename_member() {
        let mut g = CardGroup::new(1, [1, 2]);
        g.rename(2, 9);
        assert_eq!(g.members(), &[1, 9]);
    }
}
