#![forbid(unsafe_code)]

//! Drag-time auto-scrolling and scroll-into-view.
//!
//! The engine only emits [`AutoScrollSignal`]s; actually scrolling belongs to
//! the host. [`EdgeScroller`] is a ready-made consumer: feed it the signals
//! and call [`step`](EdgeScroller::step) on each animation tick to get the
//! scroll delta for the current pointer position.

use blocksel_core::geometry::{Point, Rect};

use crate::config::AutoScrollConfig;
use crate::provider::Scope;

/// Lifecycle of edge auto-scrolling during one drag session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutoScrollSignal {
    /// A session started in `scope`; `client` is the pointer position.
    Start { scope: Scope, client: Point },
    /// The pointer moved while dragging.
    Track { client: Point },
    /// The session ended.
    Stop,
}

/// Direction for [`reveal_offset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealDirection {
    Up,
    Down,
}

/// Edge-proximity scroller driven by [`AutoScrollSignal`]s.
#[derive(Debug, Clone)]
pub struct EdgeScroller {
    config: AutoScrollConfig,
    active: Option<Scope>,
    client: Point,
}

impl EdgeScroller {
    pub fn new(config: AutoScrollConfig) -> Self {
        Self {
            config,
            active: None,
            client: Point::default(),
        }
    }

    pub fn apply(&mut self, signal: &AutoScrollSignal) {
        match *signal {
            AutoScrollSignal::Start { scope, client } => {
                self.active = Some(scope);
                self.client = client;
            }
            AutoScrollSignal::Track { client } => {
                if self.active.is_some() {
                    self.client = client;
                }
            }
            AutoScrollSignal::Stop => self.active = None,
        }
    }

    /// Scope being scrolled, `None` when no drag is active.
    pub fn active_scope(&self) -> Option<Scope> {
        self.active
    }

    /// Signed scroll delta for this tick, given the viewport's client-space
    /// top and height.
    ///
    /// Speed grows linearly from zero at `edge_margin` to `max_step` at the
    /// edge and beyond.
    pub fn step(&self, viewport_top: f64, viewport_height: f64) -> f64 {
        if self.active.is_none() || !self.client.is_finite() {
            return 0.0;
        }
        let margin = self.config.edge_margin;
        let above = self.client.y - viewport_top;
        let below = viewport_top + viewport_height - self.client.y;

        if above < margin {
            -self.speed(above, margin)
        } else if below < margin {
            self.speed(below, margin)
        } else {
            0.0
        }
    }

    fn speed(&self, distance: f64, margin: f64) -> f64 {
        let closeness = (1.0 - distance / margin).clamp(0.0, 1.0);
        self.config.max_step * closeness
    }
}

impl Default for EdgeScroller {
    fn default() -> Self {
        Self::new(AutoScrollConfig::default())
    }
}

/// New scroll offset that brings `rect` (normalized container space) into
/// view when moving in `direction`, or `None` if it is already visible.
///
/// The top `header_height` pixels of the viewport are covered by a sticky
/// header and do not count as visible.
pub fn reveal_offset(
    rect: Rect,
    direction: RevealDirection,
    scroll_top: f64,
    viewport_height: f64,
    header_height: f64,
) -> Option<f64> {
    if !rect.is_valid() {
        return None;
    }
    match direction {
        RevealDirection::Up => {
            (rect.top() <= scroll_top + header_height)
                .then(|| (rect.top() - rect.height - header_height).max(0.0))
        }
        RevealDirection::Down => (rect.bottom() >= scroll_top + viewport_height)
            .then(|| (rect.bottom() + rect.height - viewport_height).max(0.0)),
    }
}
