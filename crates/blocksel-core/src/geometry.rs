#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! All selection geometry lives in one normalized space: container-relative,
//! scroll-adjusted, in CSS pixels. Values are `f64` because hosts report
//! fractional layout boxes.

/// A point in normalized (or raw page) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset the point by `dx`, `dy`.
    #[inline]
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Both coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An axis-aligned rectangle used for node boxes and the drag rectangle.
///
/// Origin at top-left, `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: f64,
    /// Top edge (inclusive).
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rectangle spanned between two corners, in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    /// Left edge (alias for x).
    #[inline]
    pub const fn left(&self) -> f64 {
        self.x
    }

    /// Top edge (alias for y).
    #[inline]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// All components are finite and the extent is non-negative.
    ///
    /// Malformed rectangles never take part in hit testing.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Strict overlap on both axes.
    ///
    /// Zero-area or malformed rectangles never collide, even when one lies
    /// entirely inside the other.
    pub fn collides(&self, other: &Rect) -> bool {
        if !self.is_valid() || !other.is_valid() || self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        if !self.collides(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Same size, moved by `dx`, `dy`.
    #[inline]
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Maps raw page coordinates into the normalized selection space.
///
/// Page scope is the identity. An overlay container subtracts its page offset
/// and adds its own scroll position, so geometry stays stable while the
/// overlay scrolls underneath the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoordinateSpace {
    /// Page offset of the scrollable overlay, `None` for the main page.
    pub container_offset: Option<Point>,
    /// Scroll position of the container when the mapping was taken.
    pub scroll_top: f64,
}

impl CoordinateSpace {
    /// Identity mapping used by the main page.
    pub const PAGE: Self = Self {
        container_offset: None,
        scroll_top: 0.0,
    };

    /// Mapping for an overlay container at `offset`, scrolled to `scroll_top`.
    pub const fn overlay(offset: Point, scroll_top: f64) -> Self {
        Self {
            container_offset: Some(offset),
            scroll_top,
        }
    }

    /// The same mapping after the container scrolled to `scroll_top`.
    #[must_use]
    pub const fn with_scroll(mut self, scroll_top: f64) -> Self {
        self.scroll_top = scroll_top;
        self
    }

    #[inline]
    pub const fn is_overlay(&self) -> bool {
        self.container_offset.is_some()
    }

    /// Translate a page point into normalized coordinates.
    pub fn to_local(&self, p: Point) -> Point {
        match self.container_offset {
            Some(offset) => Point::new(p.x - offset.x, p.y - offset.y + self.scroll_top),
            None => p,
        }
    }

    /// Translate a page-space box into normalized coordinates.
    pub fn rect_to_local(&self, r: Rect) -> Rect {
        let origin = self.to_local(Point::new(r.x, r.y));
        Rect::new(origin.x, origin.y, r.width, r.height)
    }
}
