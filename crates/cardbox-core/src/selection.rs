//! Selection state and keyboard navigation for one board.

use crate::cards::CardId;
use crate::deck::Deck;
use crate::group::GroupId;
use crate::input::{Direction, Key, KeyEvent};

/// Whether anything is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// Nothing selected; the board holds keyboard focus.
    Inactive,
    /// One or more cards selected; the focus sink intercepts navigation keys.
    Active,
}

/// Who owns keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Board,
    /// Invisible sink used while a selection is active.
    Sink,
    /// A card's own controls (text editing).
    Card(CardId),
}

/// What a key press means while a selection is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Alt+Arrow: move the selected cards by one step.
    Move(Direction),
    /// Shift+Arrow: add the nearest card in that direction.
    Extend(Direction),
    /// Arrow: replace the selection with the nearest card.
    Replace(Direction),
    Delete,
    /// Any other key: drop the selection and give focus back.
    Deactivate,
    /// Nothing selected, nothing to do.
    Ignore,
}

/// Owns the selected set of one board.
#[derive(Debug, Clone)]
pub struct SelectionManager {
    selected: Vec<CardId>,
    /// Pivot for navigation and the focus target on deactivation.
    last: Option<CardId>,
    focus: Focus,
}

impl Default for SelectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionManager {
    pub fn new() -> Self {
        Self {
            selected: Vec::new(),
            last: None,
            focus: Focus::Board,
        }
    }

    pub fn state(&self) -> SelectionState {
        if self.selected.is_empty() {
            SelectionState::Inactive
        } else {
            SelectionState::Active
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == SelectionState::Active
    }

    /// Selected ids in selection order.
    pub fn selected(&self) -> &[CardId] {
        &self.selected
    }

    pub fn contains(&self, card: CardId) -> bool {
        self.selected.contains(&card)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// The last touched card.
    pub fn last(&self) -> Option<CardId> {
        self.last
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    /// Select `card`, clearing the rest first when `exclusive`.
    pub fn select(&mut self, card: CardId, exclusive: bool) {
        if exclusive {
            self.selected.clear();
        }
        if !self.selected.contains(&card) {
            self.selected.push(card);
        }
        self.last = Some(card);
        self.focus = Focus::Sink;
    }

    /// Drop `card` from the selection. If it was the pivot and others stay
    /// selected, the most recently selected one becomes the pivot.
    pub fn unselect(&mut self, card: CardId) {
        self.selected.retain(|&c| c != card);
        if self.selected.is_empty() {
            self.deactivate();
        } else if self.last == Some(card) {
            self.last = self.selected.last().copied();
        }
    }

    /// Flip `card` in or out of the selection.
    pub fn toggle(&mut self, card: CardId) {
        if self.contains(card) {
            self.unselect(card);
        } else {
            self.select(card, false);
        }
    }

    /// Clear everything and return focus to the last touched card, or to
    /// the board when there is none.
    pub fn unselect_all(&mut self) {
        self.selected.clear();
        self.deactivate();
    }

    fn deactivate(&mut self) {
        self.focus = match self.last {
            Some(card) => Focus::Card(card),
            None => Focus::Board,
        };
    }

    /// Select every resolvable member of a group. Missing members are
    /// skipped. If the pivot belongs to the group it stays the pivot.
    /// Returns the number of cards selected from the group.
    pub fn select_group(&mut self, deck: &Deck, group: GroupId, exclusive: bool) -> usize {
        let members = deck.resolve_group(group);
        if members.is_empty() {
            return 0;
        }
        let pivot = self.last;
        if exclusive {
            self.selected.clear();
        }
        for &member in &members {
            self.select(member, false);
        }
        if let Some(p) = pivot.filter(|p| members.contains(p)) {
            self.last = Some(p);
        }
        members.len()
    }

    /// Drop ids that no longer exist.
    pub fn forget(&mut self, cards: &[CardId]) {
        self.selected.retain(|c| !cards.contains(c));
        if self.last.is_some_and(|l| cards.contains(&l)) {
            self.last = self.selected.last().copied();
        }
        if matches!(self.focus, Focus::Card(card) if cards.contains(&card)) {
            self.focus = Focus::Board;
        }
        if self.selected.is_empty() && self.focus == Focus::Sink {
            self.deactivate();
        }
    }

    /// Decide what a key press does. Alt wins over Shift, Shift over a bare
    /// arrow; Delete deletes; everything else deactivates.
    pub fn resolve_key(&self, event: &KeyEvent) -> KeyAction {
        if !self.is_active() {
            return KeyAction::Ignore;
        }
        match (&event.key, event.key.direction()) {
            (_, Some(dir)) if event.modifiers.alt => KeyAction::Move(dir),
            (_, Some(dir)) if event.modifiers.shift => KeyAction::Extend(dir),
            (_, Some(dir)) => KeyAction::Replace(dir),
            (Key::Delete, None) => KeyAction::Delete,
            _ => KeyAction::Deactivate,
        }
    }
}
