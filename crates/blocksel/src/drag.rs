#![forbid(unsafe_code)]

//! Drag rectangle geometry for one gesture.
//!
//! [`DragTracker`] owns the anchor, the latest pointer position and the
//! scroll bookkeeping of a session. It is a pure value: it never reads the
//! host, callers pass the current scroll offset in.
//!
//! # Motion threshold
//!
//! A gesture only counts as a drag once the rectangle's width or height
//! reaches the configured threshold. Smaller movement keeps it a click, and
//! [`update`](DragTracker::update) reports `None` so callers skip hit testing.
//!
//! # Scrolling
//!
//! On the main page, pointer page coordinates go stale when the document
//! scrolls under a stationary pointer, so the last pointer point is shifted
//! by the scroll delta. Inside an overlay the coordinate space already folds
//! the container's scroll in, so the point is only re-normalized.

use blocksel_core::geometry::{CoordinateSpace, Point, Rect};

/// What to do with the node index after a scroll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexAction {
    /// Recompute boxes of already-indexed nodes.
    Refresh,
    /// Walk the tree again; the viewport moved far enough that nodes may
    /// have entered or left it.
    Rebuild,
}

/// Geometry produced by a scroll tick during an active drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollStep {
    pub rect: Rect,
    /// Synthetic page point the rectangle was computed from.
    pub page: Point,
    pub index: IndexAction,
}

/// Anchor/current bookkeeping for an active drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragTracker {
    anchor: Point,
    current: Point,
    last_page: Point,
    last_client: Point,
    scroll_top: f64,
    rebuild_top: f64,
    space: CoordinateSpace,
    threshold: f64,
    rebuild_fraction: f64,
    moved: bool,
}

impl DragTracker {
    /// Record the anchor of a new gesture; the motion flag starts cleared.
    pub fn start(
        page: Point,
        client: Point,
        scroll_top: f64,
        space: CoordinateSpace,
        threshold: f64,
        rebuild_fraction: f64,
    ) -> Self {
        let space = space.with_scroll(scroll_top);
        let anchor = space.to_local(page);
        Self {
            anchor,
            current: anchor,
            last_page: page,
            last_client: client,
            scroll_top,
            rebuild_top: scroll_top,
            space,
            threshold,
            rebuild_fraction,
            moved: false,
        }
    }

    /// Move the current point. Returns the drag rectangle in normalized space
    /// once it reaches the motion threshold, `None` below it.
    pub fn update(&mut self, page: Point, client: Point, scroll_top: f64) -> Option<Rect> {
        self.last_page = page;
        self.last_client = client;

        let local = self.space.with_scroll(scroll_top).to_local(page);
        let rect = Rect::from_corners(self.anchor, local);
        if !self.reaches_threshold(&rect) {
            return None;
        }

        self.current = local;
        self.scroll_top = scroll_top;
        self.moved = true;
        Some(rect)
    }

    /// Recompute the rectangle after the container scrolled to `scroll_top`.
    ///
    /// Ignored until the gesture has become a drag.
    pub fn on_scroll(&mut self, scroll_top: f64, viewport_height: f64) -> Option<ScrollStep> {
        if !self.moved {
            return None;
        }

        let space = self.space.with_scroll(scroll_top);
        let page = if space.is_overlay() {
            self.last_page
        } else {
            self.last_page.offset(0.0, scroll_top - self.scroll_top)
        };
        let local = space.to_local(page);
        let rect = Rect::from_corners(self.anchor, local);
        if !self.reaches_threshold(&rect) {
            return None;
        }
        self.current = local;

        let index = if (scroll_top - self.rebuild_top).abs()
            >= viewport_height.max(0.0) * self.rebuild_fraction
        {
            self.rebuild_top = scroll_top;
            IndexAction::Rebuild
        } else {
            IndexAction::Refresh
        };

        Some(ScrollStep { rect, page, index })
    }

    fn reaches_threshold(&self, rect: &Rect) -> bool {
        rect.is_valid() && (rect.width >= self.threshold || rect.height >= self.threshold)
    }

    /// Current rectangle (degenerate before the first real move).
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.anchor, self.current)
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// The gesture moved past the threshold at least once.
    pub fn has_moved(&self) -> bool {
        self.moved
    }

    pub fn last_page(&self) -> Point {
        self.last_page
    }

    pub fn last_client(&self) -> Point {
        self.last_client
    }

    /// Coordinate space at scroll offset `scroll_top`.
    pub fn space_at(&self, scroll_top: f64) -> CoordinateSpace {
        self.space.with_scroll(scroll_top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_tracker(x: f64, y: f64) -> DragTracker {
        let p = Point::new(x, y);
        DragTracker::start(p, p, 0.0, CoordinateSpace::PAGE, 10.0, 0.5)
    }

    #[test]
    fn sub_threshold_movement_is_not_a_drag() {
        let mut t = page_tracker(100.0, 100.0);
        let p = Point::new(109.0, 105.0);
        assert_eq!(t.update(p, p, 0.0), None);
        assert!(!t.has_moved());
        assert!(t.rect().is_empty());
    }

    #[test]
    fn threshold_on_either_axis_starts_drag() {
        let mut t = page_tracker(100.0, 100.0);
        let p = Point::new(102.0, 110.0);
        assert_eq!(t.update(p, p, 0.0), Some(Rect::new(100.0, 100.0, 2.0, 10.0)));
        assert!(t.has_moved());
    }

    #[test]
    fn rectangle_is_direction_independent() {
        let mut t = page_tracker(100.0, 100.0);
        let p = Point::new(60.0, 40.0);
        assert_eq!(t.update(p, p, 0.0), Some(Rect::new(60.0, 40.0, 40.0, 60.0)));
    }

    #[test]
    fn scroll_before_motion_is_ignored() {
        let mut t = page_tracker(0.0, 0.0);
        assert_eq!(t.on_scroll(300.0, 800.0), None);
    }

    #[test]
    fn page_scroll_shifts_last_point_by_delta() {
        let mut t = page_tracker(10.0, 10.0);
        let p = Point::new(50.0, 50.0);
        t.update(p, p, 0.0);

        let step = t.on_scroll(100.0, 800.0).expect("drag is active");
        assert_eq!(step.page, Point::new(50.0, 150.0));
        assert_eq!(step.rect, Rect::new(10.0, 10.0, 40.0, 140.0));
        assert_eq!(step.index, IndexAction::Refresh);
    }

    #[test]
    fn scrolling_half_a_viewport_requests_rebuild_once() {
        let mut t = page_tracker(10.0, 10.0);
        let p = Point::new(50.0, 50.0);
        t.update(p, p, 0.0);

        assert_eq!(t.on_scroll(399.0, 800.0).map(|s| s.index), Some(IndexAction::Refresh));
        assert_eq!(t.on_scroll(400.0, 800.0).map(|s| s.index), Some(IndexAction::Rebuild));
        // Distance is measured from the last rebuild.
        assert_eq!(t.on_scroll(500.0, 800.0).map(|s| s.index), Some(IndexAction::Refresh));
        assert_eq!(t.on_scroll(0.0, 800.0).map(|s| s.index), Some(IndexAction::Rebuild));
    }

    #[test]
    fn overlay_coordinates_are_container_relative() {
        let space = CoordinateSpace::overlay(Point::new(200.0, 100.0), 0.0);
        let start = Point::new(210.0, 110.0);
        let mut t = DragTracker::start(start, start, 50.0, space, 10.0, 0.5);
        assert_eq!(t.anchor(), Point::new(10.0, 60.0));

        let p = Point::new(240.0, 130.0);
        assert_eq!(t.update(p, p, 50.0), Some(Rect::new(10.0, 60.0, 30.0, 20.0)));

        // The overlay scrolls by 100 under a stationary pointer.
        let step = t.on_scroll(150.0, 600.0).expect("drag is active");
        assert_eq!(step.page, p);
        assert_eq!(step.rect, Rect::new(10.0, 60.0, 30.0, 120.0));
    }
}
