//! Scrolled window onto a board's content.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// The visible part of a board.
///
/// Content coordinates are the board's scaled coordinates; client
/// coordinates are relative to the top-left of the visible area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Scroll offset: the content point shown at the client origin.
    pub offset: Vec2,
    /// Size of the visible area.
    pub size: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Size::new(800.0, 600.0))
    }
}

impl Viewport {
    pub fn new(size: Size) -> Self {
        Self {
            offset: Vec2::ZERO,
            size,
        }
    }

    /// Convert a client point to content coordinates.
    pub fn client_to_content(&self, point: Point) -> Point {
        point + self.offset
    }

    /// Convert a content point to client coordinates.
    pub fn content_to_client(&self, point: Point) -> Point {
        point - self.offset
    }

    /// The content rectangle currently in view.
    pub fn visible_rect(&self) -> Rect {
        Rect::from_origin_size(self.offset.to_point(), self.size)
    }

    /// Keep the offset within `[0, virtual - size]` on each axis.
    pub fn clamp(&mut self, virtual_size: Size) {
        let max_x = (virtual_size.width - self.size.width).max(0.0);
        let max_y = (virtual_size.height - self.size.height).max(0.0);
        self.offset = Vec2::new(self.offset.x.clamp(0.0, max_x), self.offset.y.clamp(0.0, max_y));
    }

    /// Set the offset directly, clamped. Returns true if it changed.
    pub fn scroll_to(&mut self, offset: Vec2, virtual_size: Size) -> bool {
        let before = self.offset;
        self.offset = offset;
        self.clamp(virtual_size);
        self.offset != before
    }

    /// Scroll the least amount needed to bring `point` into view.
    pub fn scroll_to_point(&mut self, point: Point, virtual_size: Size) -> bool {
        self.scroll_to_rect(Rect::from_points(point, point), virtual_size)
    }

    /// Scroll the least amount needed to bring `rect` into view. Each axis is
    /// decided on its own; an axis that already shows the target is left
    /// alone. A target larger than the view is aligned to its top-left.
    pub fn scroll_to_rect(&mut self, rect: Rect, virtual_size: Size) -> bool {
        let visible = self.visible_rect();
        let x = axis_scroll(visible.x0, visible.x1, rect.x0, rect.x1, self.size.width);
        let y = axis_scroll(visible.y0, visible.y1, rect.y0, rect.y1, self.size.height);
        self.scroll_to(Vec2::new(x, y), virtual_size)
    }

    /// Multiply the offset by `factor`, as when the board is rescaled.
    pub fn rescale(&mut self, factor: f64, virtual_size: Size) {
        self.offset = self.offset * factor;
        self.clamp(virtual_size);
    }
}

fn axis_scroll(view0: f64, view1: f64, target0: f64, target1: f64, extent: f64) -> f64 {
    if target0 >= view0 && target1 <= view1 {
        view0
    } else if target0 < view0 || target1 - target0 > extent {
        target0
    } else {
        target1 - extent
    }
}
