//! Board: the interactive layout and selection engine for one deck.

use crate::cards::{Card, CardId, CardKind, CardTrait, Content};
use crate::clipboard::{Clipboard, ClipboardPayload};
use crate::deck::{Deck, Line};
use crate::dump::{CardDump, DeckDump, LoadError};
use crate::geometry::{dist2, rect_from_corners, scale_point, union_all};
use crate::group::GroupId;
use crate::input::{Direction, Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
use crate::selection::{Focus, KeyAction, SelectionManager};
use crate::tags::TagIndex;
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Board layout settings. Lengths are at scale 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Gap between cards placed or arranged by the board.
    pub card_padding: f64,
    pub content_size: Size,
    pub header_size: Size,
    pub image_size: Size,
    /// Distance moved by Alt+Arrow, in content units.
    pub move_step: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub viewport_size: Size,
    /// Recompute tight bounds instead of only ever growing the virtual size.
    pub shrink_to_fit: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            card_padding: 15.0,
            content_size: Size::new(250.0, 150.0),
            header_size: Size::new(150.0, 32.0),
            image_size: Size::new(50.0, 50.0),
            move_step: 10.0,
            min_scale: 0.1,
            max_scale: 4.0,
            viewport_size: Size::new(800.0, 600.0),
            shrink_to_fit: false,
        }
    }
}

impl BoardConfig {
    /// Size of a freshly created card of `kind`.
    pub fn default_size(&self, kind: CardKind) -> Size {
        match kind {
            CardKind::Content => self.content_size,
            CardKind::Header => self.header_size,
            CardKind::Image => self.image_size,
        }
    }
}

/// Axis for [`Board::arrange_selection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Structural changes, queued for views such as a minimap or tag sidebar.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    CardCreated(CardId),
    /// All cards removed by one operation.
    CardsDeleted { ids: Vec<CardId> },
    CardsMoved { ids: Vec<CardId> },
    SelectionChanged(Vec<CardId>),
    FocusChanged(Focus),
    ScaleChanged(f64),
    Scrolled(Vec2),
    VirtualSizeChanged(Size),
    /// A content region needs repainting.
    RefreshRequested(Rect),
    GroupCreated(GroupId),
}

/// On-screen representation of one card. Refers to the card by id only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardView {
    pub card: CardId,
    pub selected: bool,
}

impl CardView {
    fn new(card: CardId) -> Self {
        Self { card, selected: false }
    }

    /// Fill colour for the card, if it still exists.
    pub fn background(&self, deck: &Deck) -> Option<Color> {
        self.colours(deck).map(|(bg, _)| bg)
    }

    /// Background and foreground colour for the card, if it still exists.
    pub fn colours(&self, deck: &Deck) -> Option<(Color, Color)> {
        deck.card(self.card).map(Card::colours)
    }
}

/// Rubber-band selection in progress.
#[derive(Debug, Clone, Copy)]
struct DragSelect {
    start: Point,
    current: Point,
}

impl DragSelect {
    fn rect(&self) -> Rect {
        rect_from_corners(self.start, self.current)
    }
}

/// Multi-card move in progress. Nothing is written to the deck until it ends.
#[derive(Debug, Clone)]
struct DragMove {
    start: Point,
    current: Point,
    /// Each moving card's top-left relative to the pointer, and its size.
    offsets: Vec<(CardId, Vec2, Size)>,
}

impl DragMove {
    fn preview(&self) -> Vec<(CardId, Rect)> {
        self.offsets
            .iter()
            .map(|&(id, offset, size)| (id, Rect::from_origin_size(self.current + offset, size)))
            .collect()
    }
}

/// Where a repeated plain click on one card is in its group cycle.
#[derive(Debug, Clone)]
struct ClickCycle {
    card: CardId,
    /// 0 is the card alone, n is the n-th group containing it.
    index: usize,
    selection: Vec<CardId>,
}

/// Interactive engine over one deck.
///
/// Card rects in the owned deck are kept in scaled content coordinates;
/// operations that take positions "in deck units" multiply by the scale.
#[derive(Debug)]
pub struct Board {
    deck: Deck,
    config: BoardConfig,
    views: Vec<CardView>,
    selection: SelectionManager,
    viewport: Viewport,
    scale: f64,
    virtual_size: Size,
    drag_select: Option<DragSelect>,
    drag_move: Option<DragMove>,
    cycle: Option<ClickCycle>,
    /// A press on an already selected card, resolved as a click on release
    /// if the pointer did not move.
    pending_click: Option<CardId>,
    events: Vec<BoardEvent>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(Deck::default(), BoardConfig::default())
    }
}

impl Board {
    /// Wrap a deck at scale 1.
    pub fn new(deck: Deck, config: BoardConfig) -> Self {
        let views = deck.cards().iter().map(|c| CardView::new(c.id())).collect();
        let mut board = Self {
            viewport: Viewport::new(config.viewport_size),
            deck,
            config,
            views,
            selection: SelectionManager::new(),
            scale: 1.0,
            virtual_size: Size::ZERO,
            drag_select: None,
            drag_move: None,
            cycle: None,
            pending_click: None,
            events: Vec::new(),
        };
        board.fit_to_children(board.padding());
        board.events.clear();
        board
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Give the deck back, dropping all view state.
    pub fn into_deck(self) -> Deck {
        self.deck
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn virtual_size(&self) -> Size {
        self.virtual_size
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport.size = size;
        self.viewport.clamp(self.virtual_size);
    }

    pub fn views(&self) -> &[CardView] {
        &self.views
    }

    pub fn view(&self, id: CardId) -> Option<&CardView> {
        self.views.iter().find(|v| v.card == id)
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn selected(&self) -> &[CardId] {
        self.selection.selected()
    }

    pub fn is_selected(&self, id: CardId) -> bool {
        self.selection.contains(id)
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.deck.card(id)
    }

    /// Bring a tag index up to date with this board's deck.
    pub fn sync_tags(&mut self, index: &mut TagIndex) {
        index.sync(&mut self.deck);
    }

    /// Mutable access for field edits (title, content, kind...).
    pub fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.deck.card_mut(id)
    }

    /// Drain queued events.
    pub fn poll_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    /// Card padding at the current scale.
    pub fn padding(&self) -> f64 {
        self.config.card_padding * self.scale
    }

    fn refresh(&mut self, rect: Rect) {
        self.events.push(BoardEvent::RefreshRequested(rect));
    }

    /// Run a selection change, then mirror it into the views and queue events.
    fn with_selection<R>(&mut self, f: impl FnOnce(&mut SelectionManager, &Deck) -> R) -> R {
        let focus = self.selection.focus();
        let result = f(&mut self.selection, &self.deck);

        let mut changed = false;
        for view in &mut self.views {
            let selected = self.selection.contains(view.card);
            if view.selected != selected {
                view.selected = selected;
                changed = true;
                if let Some(card) = self.deck.card(view.card) {
                    self.events.push(BoardEvent::RefreshRequested(card.rect()));
                }
            }
        }
        if changed {
            self.events.push(BoardEvent::SelectionChanged(self.selection.selected().to_vec()));
        }
        if self.selection.focus() != focus {
            self.events.push(BoardEvent::FocusChanged(self.selection.focus()));
        }
        result
    }

    // --- creation --------------------------------------------------------

    /// Create a card with its top-left at `position`, given in deck units
    /// (unscaled).
    pub fn add_card(&mut self, kind: CardKind, position: Point) -> CardId {
        let size = self.config.default_size(kind);
        let rect = Rect::from_origin_size(
            scale_point(position, self.scale),
            Size::new(size.width * self.scale, size.height * self.scale),
        );
        let id = self.deck.new_card(kind, rect);
        self.views.push(CardView::new(id));
        log::debug!("added {kind} card {id} at {position:?}");
        self.events.push(BoardEvent::CardCreated(id));
        self.refresh(rect);
        self.fit_to_children(self.padding());
        id
    }

    /// Create a card at an automatic position: at the padding offset on an
    /// empty deck; next to the last selected (or focused) card when there is
    /// one, to its right or beneath it; otherwise right of the right-most
    /// card, aligned to the highest top. The new card takes focus.
    pub fn place_new_card(&mut self, kind: CardKind, below: bool) -> CardId {
        let pad = self.padding();
        let pivot = self
            .selection
            .last()
            .filter(|id| self.selection.contains(*id))
            .or_else(|| self.selection.selected().last().copied())
            .or(match self.selection.focus() {
                Focus::Card(id) => Some(id),
                _ => None,
            })
            .and_then(|id| self.deck.card(id))
            .map(Card::rect);

        let scaled = if self.deck.is_empty() {
            Point::new(pad, pad)
        } else if let Some(rect) = pivot {
            if below {
                Point::new(rect.x0, rect.y1 + pad)
            } else {
                Point::new(rect.x1 + pad, rect.y0)
            }
        } else {
            let cards = self.deck.cards();
            let right = cards.iter().map(|c| c.rect().x1).fold(f64::NEG_INFINITY, f64::max);
            let top = cards.iter().map(|c| c.rect().y0).fold(f64::INFINITY, f64::min);
            Point::new(right + pad, top)
        };

        let id = self.add_card(kind, scale_point(scaled, 1.0 / self.scale));
        self.with_selection(|sel, _| {
            sel.unselect_all();
            sel.set_focus(Focus::Card(id));
        });
        self.scroll_to_card(id);
        id
    }

    // --- deletion --------------------------------------------------------

    fn delete_cards(&mut self, ids: &[CardId]) -> usize {
        let removed = self.deck.remove_cards(ids);
        if removed.is_empty() {
            return 0;
        }
        let ids: Vec<CardId> = removed.iter().map(Card::id).collect();
        self.views.retain(|v| !ids.contains(&v.card));
        self.with_selection(|sel, _| sel.forget(&ids));
        if let Some(rect) = union_all(removed.iter().map(Card::rect)) {
            self.refresh(rect);
        }
        log::debug!("deleted {} cards", ids.len());
        let count = ids.len();
        self.events.push(BoardEvent::CardsDeleted { ids });
        if self.config.shrink_to_fit {
            self.fit_to_children(self.padding());
        }
        count
    }

    pub fn delete_card(&mut self, id: CardId) -> bool {
        self.delete_cards(&[id]) == 1
    }

    /// Delete every selected card. One `CardsDeleted` event covers them all.
    pub fn delete_selection(&mut self) -> usize {
        let ids = self.selection.selected().to_vec();
        self.delete_cards(&ids)
    }

    // --- selection -------------------------------------------------------

    pub fn select(&mut self, id: CardId, exclusive: bool) {
        if self.deck.contains(id) {
            self.with_selection(|sel, _| sel.select(id, exclusive));
        }
    }

    pub fn unselect(&mut self, id: CardId) {
        self.with_selection(|sel, _| sel.unselect(id));
    }

    pub fn unselect_all(&mut self) {
        self.with_selection(|sel, _| sel.unselect_all());
    }

    pub fn select_all(&mut self) {
        let ids = self.deck.card_ids();
        self.with_selection(|sel, _| {
            for id in ids {
                sel.select(id, false);
            }
        });
    }

    pub fn select_group(&mut self, group: GroupId, exclusive: bool) -> usize {
        self.with_selection(|sel, deck| sel.select_group(deck, group, exclusive))
    }

    /// Give a card's own controls keyboard focus.
    pub fn focus_card(&mut self, id: CardId) {
        if self.deck.contains(id) {
            self.with_selection(|sel, _| sel.set_focus(Focus::Card(id)));
        }
    }

    /// Nearest card beyond `id` in `direction`.
    ///
    /// Candidates are filtered on the edge facing the move (for LEFT, a
    /// candidate's right edge must be left of this card's left edge) but
    /// ranked by the distance between top-left corners.
    pub fn nearest(&self, id: CardId, direction: Direction) -> Option<CardId> {
        let origin = self.deck.card(id)?.rect();
        self.deck
            .cards()
            .iter()
            .filter(|c| c.id() != id)
            .filter(|c| {
                let r = c.rect();
                match direction {
                    Direction::Left => r.x1 < origin.x0,
                    Direction::Right => r.x0 > origin.x1,
                    Direction::Up => r.y1 < origin.y0,
                    Direction::Down => r.y0 > origin.y1,
                }
            })
            .min_by(|a, b| {
                let da = dist2(a.rect().origin(), origin.origin());
                let db = dist2(b.rect().origin(), origin.origin());
                da.total_cmp(&db)
            })
            .map(Card::id)
    }

    /// Select the nearest card from the last touched one. Replaces the
    /// selection when `exclusive`, extends it otherwise.
    pub fn select_nearest(&mut self, direction: Direction, exclusive: bool) -> Option<CardId> {
        let pivot = self.selection.last()?;
        let next = self.nearest(pivot, direction)?;
        self.with_selection(|sel, _| sel.select(next, exclusive));
        self.scroll_to_card(next);
        Some(next)
    }

    /// Mouse click on a card. Ctrl toggles it; a plain click on the sole
    /// selected card walks through the groups containing it and back.
    pub fn click_card(&mut self, id: CardId, modifiers: Modifiers) {
        if !self.deck.contains(id) {
            return;
        }
        if modifiers.command() {
            self.cycle = None;
            self.with_selection(|sel, _| sel.toggle(id));
            return;
        }

        let groups = self.deck.groups_containing(id);
        let current = self.selection.selected().to_vec();
        let index = match &self.cycle {
            Some(c) if c.card == id && c.selection == current => (c.index + 1) % (groups.len() + 1),
            _ if current == [id] && !groups.is_empty() => 1,
            _ => 0,
        };

        if index == 0 {
            self.with_selection(|sel, _| sel.select(id, true));
        } else {
            let group = groups[index - 1];
            self.with_selection(|sel, deck| sel.select_group(deck, group, true));
        }
        self.cycle = Some(ClickCycle {
            card: id,
            index,
            selection: self.selection.selected().to_vec(),
        });
    }

    // --- layout ----------------------------------------------------------

    fn commit_moves(&mut self, moves: Vec<(CardId, Point)>) {
        let mut ids = Vec::with_capacity(moves.len());
        let mut dirty = Vec::new();
        for (id, position) in moves {
            if let Some(card) = self.deck.card_mut(id) {
                dirty.push(card.rect());
                card.set_position(position);
                dirty.push(card.rect());
                ids.push(id);
            }
        }
        if ids.is_empty() {
            return;
        }
        if let Some(rect) = union_all(dirty) {
            self.refresh(rect);
        }
        self.events.push(BoardEvent::CardsMoved { ids });
        self.fit_to_children(self.padding());
    }

    /// Line up the selection. Horizontally: tops aligned to the left-most
    /// card, left to right, one padding apart. Vertically: the transpose.
    pub fn arrange_selection(&mut self, orientation: Orientation) {
        let mut rects: Vec<(CardId, Rect)> = self
            .selection
            .selected()
            .iter()
            .filter_map(|&id| self.deck.card(id).map(|c| (id, c.rect())))
            .collect();
        if rects.is_empty() {
            return;
        }
        let pad = self.padding();

        let moves = match orientation {
            Orientation::Horizontal => {
                rects.sort_by(|a, b| a.1.x0.total_cmp(&b.1.x0));
                let top = rects[0].1.y0;
                let mut x = rects[0].1.x0;
                rects
                    .iter()
                    .map(|&(id, r)| {
                        let p = Point::new(x, top);
                        x += r.width() + pad;
                        (id, p)
                    })
                    .collect()
            }
            Orientation::Vertical => {
                let left = rects.iter().map(|(_, r)| r.x0).fold(f64::INFINITY, f64::min);
                rects.sort_by(|a, b| a.1.y0.total_cmp(&b.1.y0));
                let mut y = rects[0].1.y0;
                rects
                    .iter()
                    .map(|&(id, r)| {
                        let p = Point::new(left, y);
                        y += r.height() + pad;
                        (id, p)
                    })
                    .collect()
            }
        };
        self.commit_moves(moves);
    }

    /// Shift every selected card by `(dx, dy)` content units.
    pub fn move_selection(&mut self, dx: f64, dy: f64) {
        let delta = Vec2::new(dx, dy);
        let moves = self
            .selection
            .selected()
            .iter()
            .filter_map(|&id| self.deck.card(id).map(|c| (id, c.position() + delta)))
            .collect();
        self.commit_moves(moves);
    }

    /// Collapse every selected content card, or expand them all if they are
    /// all collapsed already.
    pub fn toggle_collapse_selection(&mut self) {
        let ids = self.selection.selected().to_vec();
        let contents: Vec<&Content> = ids.iter().filter_map(|&id| self.deck.card(id)?.as_content()).collect();
        if contents.is_empty() {
            return;
        }
        let collapse = !contents.iter().all(|c| c.is_collapsed());
        let mut dirty = Vec::new();
        for id in ids {
            if let Some(content) = self.deck.card_mut(id).and_then(Card::as_content_mut) {
                content.set_collapsed(collapse);
                dirty.push(content.rect());
            }
        }
        if let Some(rect) = union_all(dirty) {
            self.refresh(rect);
        }
    }

    /// Bring a card to the front of the z-order.
    pub fn raise_card(&mut self, id: CardId) -> bool {
        let raised = self.deck.raise_card(id);
        if raised {
            if let Some(rect) = self.deck.card(id).map(Card::rect) {
                self.refresh(rect);
            }
        }
        raised
    }

    /// Send a card to the back of the z-order.
    pub fn lower_card(&mut self, id: CardId) -> bool {
        let lowered = self.deck.lower_card(id);
        if lowered {
            if let Some(rect) = self.deck.card(id).map(Card::rect) {
                self.refresh(rect);
            }
        }
        lowered
    }

    /// Grow the virtual size to hold every card plus `padding`. It never
    /// shrinks unless `shrink_to_fit` is set.
    pub fn fit_to_children(&mut self, padding: f64) {
        let needed = match self.deck.bounds() {
            Some(b) => Size::new(b.x1.max(0.0) + padding, b.y1.max(0.0) + padding),
            None => Size::ZERO,
        };
        let size = if self.config.shrink_to_fit {
            needed
        } else {
            Size::new(
                self.virtual_size.width.max(needed.width),
                self.virtual_size.height.max(needed.height),
            )
        };
        if size != self.virtual_size {
            self.virtual_size = size;
            self.viewport.clamp(size);
            self.events.push(BoardEvent::VirtualSizeChanged(size));
        }
    }

    // --- drag select -----------------------------------------------------

    pub fn drag_start(&mut self, point: Point) {
        self.drag_select = Some(DragSelect {
            start: point,
            current: point,
        });
    }

    pub fn drag_update(&mut self, point: Point) {
        let Some(drag) = self.drag_select.as_mut() else {
            return;
        };
        let before = drag.rect();
        drag.current = point;
        let after = drag.rect();
        self.refresh(before.union(after));
    }

    /// Finish the rubber band and add every card it overlaps to the
    /// selection. A zero-area band selects nothing.
    pub fn drag_end(&mut self, point: Point) -> Vec<CardId> {
        let Some(mut drag) = self.drag_select.take() else {
            return Vec::new();
        };
        drag.current = point;
        let rect = drag.rect();
        self.refresh(rect);
        if rect.area() <= 0.0 {
            return Vec::new();
        }
        let ids = self.deck.cards_in_rect(rect, self.scale);
        let picked = ids.clone();
        self.with_selection(|sel, _| {
            for id in picked {
                sel.select(id, false);
            }
        });
        ids
    }

    /// Drop the rubber band without selecting.
    pub fn drag_cancel(&mut self) {
        if let Some(drag) = self.drag_select.take() {
            self.refresh(drag.rect());
        }
    }

    /// Current rubber band, if any.
    pub fn drag_rect(&self) -> Option<Rect> {
        self.drag_select.map(|d| d.rect())
    }

    // --- drag move -------------------------------------------------------

    /// Begin moving the selection with the pointer at `point`. An unselected
    /// card is selected on its own first.
    pub fn move_start(&mut self, id: CardId, point: Point) -> bool {
        if !self.deck.contains(id) {
            return false;
        }
        if !self.selection.contains(id) {
            self.with_selection(|sel, _| sel.select(id, true));
        }
        let offsets = self
            .selection
            .selected()
            .iter()
            .filter_map(|&sid| self.deck.card(sid))
            .map(|c| (c.id(), c.position() - point, c.size()))
            .collect();
        self.drag_move = Some(DragMove {
            start: point,
            current: point,
            offsets,
        });
        true
    }

    /// Update the move preview. Card data is untouched.
    pub fn move_update(&mut self, point: Point) {
        let Some(drag) = self.drag_move.as_mut() else {
            return;
        };
        let before = union_all(drag.preview().into_iter().map(|(_, r)| r));
        drag.current = point;
        let after = union_all(drag.preview().into_iter().map(|(_, r)| r));
        if let Some(rect) = union_all(before.into_iter().chain(after)) {
            self.refresh(rect);
        }
    }

    /// Commit the move at `point`.
    pub fn move_end(&mut self, point: Point) {
        let Some(mut drag) = self.drag_move.take() else {
            return;
        };
        drag.current = point;
        if point == drag.start {
            return;
        }
        let moves = drag.offsets.iter().map(|&(id, offset, _)| (id, point + offset)).collect();
        self.commit_moves(moves);
    }

    /// Abandon the move; cards keep their pre-drag positions.
    pub fn move_cancel(&mut self) {
        if let Some(drag) = self.drag_move.take() {
            if let Some(rect) = union_all(drag.preview().into_iter().map(|(_, r)| r)) {
                self.refresh(rect);
            }
        }
    }

    /// Where the moving cards would land if the move ended now.
    pub fn move_preview(&self) -> Vec<(CardId, Rect)> {
        self.drag_move.as_ref().map(DragMove::preview).unwrap_or_default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_move.is_some() || self.drag_select.is_some()
    }

    // --- input -----------------------------------------------------------

    /// Route a pointer event given in client coordinates.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
                modifiers,
            } => {
                let point = self.viewport.client_to_content(position);
                self.pending_click = None;
                match self.deck.card_at(point, self.scale) {
                    Some(id) => {
                        // pressing a selected card may start a move of the whole selection
                        if self.selection.contains(id) && !modifiers.command() {
                            self.pending_click = Some(id);
                        } else {
                            self.click_card(id, modifiers);
                        }
                        if self.selection.contains(id) {
                            self.move_start(id, point);
                        }
                    }
                    None => {
                        if !(modifiers.shift || modifiers.command()) {
                            self.unselect_all();
                        }
                        self.drag_start(point);
                    }
                }
            }
            PointerEvent::Move { position } => {
                let point = self.viewport.client_to_content(position);
                if self.drag_move.is_some() {
                    self.move_update(point);
                } else if self.drag_select.is_some() {
                    self.drag_update(point);
                }
            }
            PointerEvent::Up {
                position,
                button: MouseButton::Left,
            } => {
                let point = self.viewport.client_to_content(position);
                let pending = self.pending_click.take();
                if let Some(start) = self.drag_move.as_ref().map(|d| d.start) {
                    self.move_end(point);
                    if let Some(id) = pending.filter(|_| point == start) {
                        self.click_card(id, Modifiers::NONE);
                    }
                } else if self.drag_select.is_some() {
                    self.drag_end(point);
                }
            }
            PointerEvent::CaptureLost => {
                self.pending_click = None;
                self.move_cancel();
                self.drag_cancel();
            }
            PointerEvent::Down { .. } | PointerEvent::Up { .. } => {}
        }
    }

    /// Handle a key press. Returns true if the board consumed it.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        match self.selection.resolve_key(event) {
            KeyAction::Move(dir) => {
                let (dx, dy) = dir.delta();
                let step = self.config.move_step;
                self.move_selection(dx * step, dy * step);
                true
            }
            KeyAction::Extend(dir) => {
                self.select_nearest(dir, false);
                true
            }
            KeyAction::Replace(dir) => {
                self.select_nearest(dir, true);
                true
            }
            KeyAction::Delete => {
                self.delete_selection();
                true
            }
            KeyAction::Deactivate => {
                self.unselect_all();
                event.key == Key::Escape
            }
            KeyAction::Ignore => false,
        }
    }

    // --- scale and scrolling ---------------------------------------------

    /// Set the zoom factor, clamped to the configured range. Every card rect,
    /// annotation stroke, the virtual size and the scroll offset are scaled
    /// by `new / old`.
    pub fn set_scale(&mut self, scale: f64) {
        if !scale.is_finite() || scale <= 0.0 {
            log::warn!("ignoring board scale {scale}");
            return;
        }
        let scale = scale.clamp(self.config.min_scale, self.config.max_scale);
        if (scale - self.scale).abs() < f64::EPSILON {
            return;
        }
        self.move_cancel();
        self.drag_cancel();

        let factor = scale / self.scale;
        self.deck.scale_geometry(factor);
        self.virtual_size = Size::new(self.virtual_size.width * factor, self.virtual_size.height * factor);
        self.viewport.rescale(factor, self.virtual_size);
        self.scale = scale;
        log::debug!("scale set to {scale}");

        self.events.push(BoardEvent::ScaleChanged(scale));
        self.events.push(BoardEvent::VirtualSizeChanged(self.virtual_size));
        self.refresh(self.viewport.visible_rect());
        self.fit_to_children(self.padding());
    }

    /// Scroll the minimum needed to show the card. No-op if fully visible.
    pub fn scroll_to_card(&mut self, id: CardId) -> bool {
        let Some(rect) = self.deck.card(id).map(Card::rect) else {
            return false;
        };
        self.scroll_to_rect(rect)
    }

    /// Scroll the minimum needed to show a content point.
    pub fn scroll_to_point(&mut self, point: Point) -> bool {
        self.scroll_to_rect(Rect::from_points(point, point))
    }

    fn scroll_to_rect(&mut self, rect: Rect) -> bool {
        let changed = self.viewport.scroll_to_rect(rect, self.virtual_size);
        if changed {
            self.events.push(BoardEvent::Scrolled(self.viewport.offset));
        }
        changed
    }

    // --- groups, annotation, clipboard -----------------------------------

    /// Make a group from the selection. `None` if nothing is selected.
    pub fn group_selected(&mut self) -> Option<GroupId> {
        if self.selection.is_empty() {
            return None;
        }
        let gid = self.deck.add_group(self.selection.selected().to_vec());
        self.events.push(BoardEvent::GroupCreated(gid));
        Some(gid)
    }

    /// Add a stroke given in content coordinates.
    pub fn annotate(&mut self, line: Line) {
        let bounds = line
            .points
            .iter()
            .map(|&p| Rect::from_points(p, p))
            .reduce(|a, b| a.union(b));
        self.deck.annotate(line);
        if let Some(rect) = bounds {
            self.refresh(rect);
        }
    }

    pub fn clear_annotation(&mut self) {
        self.deck.clear_annotation();
        self.refresh(Rect::from_origin_size(Point::ZERO, self.virtual_size));
    }

    /// Put the selected cards on the clipboard. Returns how many were copied.
    pub fn copy_selection(&self, clipboard: &mut dyn Clipboard) -> usize {
        let payload = ClipboardPayload {
            cards: self
                .selection
                .selected()
                .iter()
                .filter_map(|&id| self.deck.card(id))
                .map(|c| CardDump::from_card(c, self.scale))
                .collect(),
        };
        if payload.cards.is_empty() {
            return 0;
        }
        match payload.to_bytes() {
            Ok(bytes) => {
                clipboard.put(bytes);
                payload.cards.len()
            }
            Err(e) => {
                log::warn!("could not serialize selection: {e}");
                0
            }
        }
    }

    /// Create fresh copies of the clipboard's cards and select them. Without
    /// a target they land one padding from where they were copied; with one
    /// (in deck units) their top-left-most corner lands on it. An empty or
    /// foreign clipboard pastes nothing.
    pub fn paste(&mut self, clipboard: &mut dyn Clipboard, position: Option<Point>) -> Vec<CardId> {
        let Some(bytes) = clipboard.get() else {
            return Vec::new();
        };
        let payload = match ClipboardPayload::from_bytes(&bytes) {
            Ok(p) => p,
            Err(e) => {
                log::debug!("clipboard holds no cards: {e}");
                return Vec::new();
            }
        };
        if payload.cards.is_empty() {
            return Vec::new();
        }

        let offset = match position {
            Some(target) => {
                let x = payload.cards.iter().map(|d| d.rect().x0).fold(f64::INFINITY, f64::min);
                let y = payload.cards.iter().map(|d| d.rect().y0).fold(f64::INFINITY, f64::min);
                target - Point::new(x, y)
            }
            None => Vec2::new(self.config.card_padding, self.config.card_padding),
        };

        let mut created = Vec::with_capacity(payload.cards.len());
        for dump in &payload.cards {
            let id = self.deck.next_card_id();
            let mut card = match dump.to_card(id, self.scale) {
                Ok(card) => card,
                Err(e) => {
                    log::warn!("skipping pasted card: {e}");
                    continue;
                }
            };
            card.set_position(scale_point(dump.rect().origin() + offset, self.scale));
            let rect = card.rect();
            if self.deck.add_card(card).is_ok() {
                self.views.push(CardView::new(id));
                self.events.push(BoardEvent::CardCreated(id));
                self.refresh(rect);
                created.push(id);
            }
        }

        let picked = created.clone();
        self.with_selection(|sel, _| {
            sel.unselect_all();
            for id in picked {
                sel.select(id, false);
            }
        });
        self.fit_to_children(self.padding());
        log::debug!("pasted {} cards", created.len());
        created
    }

    // --- persistence -----------------------------------------------------

    /// Dump the deck with the current scale divided out.
    pub fn dump(&self) -> DeckDump {
        self.deck.dump_with_scale(self.scale)
    }

    /// Replace the deck from a dump, keeping the current scale. On error
    /// the board is unchanged.
    pub fn load(&mut self, dump: &DeckDump) -> Result<(), LoadError> {
        let mut scratch = Deck::from_dump(dump)?;
        scratch.scale_geometry(self.scale);
        self.drag_move = None;
        self.drag_select = None;
        self.cycle = None;
        self.pending_click = None;
        self.deck.restore(scratch);
        self.views = self.deck.cards().iter().map(|c| CardView::new(c.id())).collect();
        self.with_selection(|sel, _| *sel = SelectionManager::new());
        self.fit_to_children(self.padding());
        self.refresh(self.viewport.visible_rect());
        Ok(())
    }
}
