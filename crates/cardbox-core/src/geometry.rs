//! Small geometry helpers shared by the board and the model.

use kurbo::{Point, Rect, Size};

/// Build a normalized rectangle spanning two arbitrary corner points.
///
/// The result always has non-negative width and height, whichever corner
/// the drag started from.
pub fn rect_from_corners(a: Point, b: Point) -> Rect {
    Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
}

/// Build a rectangle from `(left, top, width, height)`.
///
/// Negative extents are clamped to zero.
pub fn rect_from_ltwh(left: f64, top: f64, width: f64, height: f64) -> Rect {
    Rect::from_origin_size(Point::new(left, top), Size::new(width.max(0.0), height.max(0.0)))
}

/// Split a rectangle back into `[left, top, width, height]`.
pub fn rect_to_ltwh(rect: Rect) -> [f64; 4] {
    [rect.x0, rect.y0, rect.width(), rect.height()]
}

/// Squared euclidean distance between two points.
pub fn dist2(a: Point, b: Point) -> f64 {
    (a.x - b.x).powi(2) + (a.y - b.y).powi(2)
}

/// Euclidean distance between two points.
pub fn dist(a: Point, b: Point) -> f64 {
    dist2(a, b).sqrt()
}

/// Inclusive point containment (edges count as inside).
pub fn contains_point(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Whether `inner` lies completely inside `outer` (edges inclusive).
pub fn contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.x1 <= outer.x1 && inner.y0 >= outer.y0 && inner.y1 <= outer.y1
}

/// Whether two rectangles overlap with a positive area.
pub fn intersects(a: Rect, b: Rect) -> bool {
    a.intersect(b).area() > 0.0
}

/// Scale a rectangle about the origin.
pub fn scale_rect(rect: Rect, factor: f64) -> Rect {
    Rect::new(rect.x0 * factor, rect.y0 * factor, rect.x1 * factor, rect.y1 * factor)
}

/// Scale a point about the origin.
pub fn scale_point(point: Point, factor: f64) -> Point {
    Point::new(point.x * factor, point.y * factor)
}

/// Union of a set of rectangles, or `None` when empty.
pub fn union_all(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().fold(None, |acc, r| {
        Some(match acc {
            Some(u) => u.union(r),
            None => r,
        })
    })
}
