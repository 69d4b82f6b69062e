#![forbid(unsafe_code)]

//! Canonical input events consumed by the selection engine.
//!
//! # Design Notes
//!
//! - Pointer coordinates are raw page coordinates; the engine normalizes them.
//! - `client` coordinates are viewport-relative and only feed auto-scroll.
//! - `Modifiers` use bitflags; Ctrl and Super are both treated as "toggle"
//!   so the same gesture works with Ctrl on Linux/Windows and Cmd on macOS.

use bitflags::bitflags;

use crate::geometry::Point;
use crate::ids::{NodeId, SelectType};

/// Input event routed into the engine by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A pointer event (down, move, up).
    Pointer(PointerEvent),

    /// The active scroll container scrolled. The new offset is read from the
    /// viewport provider.
    Scroll,

    /// The window lost focus.
    Blur,
}

/// A pointer event.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,

    /// Page coordinates (document origin).
    pub page: Point,

    /// Viewport coordinates.
    pub client: Point,

    /// Button that changed state for down/up; `Primary` for moves.
    pub button: PointerButton,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// Closest selectable node under the pointer, if any.
    pub target: Option<PointerTarget>,
}

impl PointerEvent {
    /// Create a pointer event whose client and page coordinates coincide.
    #[must_use]
    pub fn new(kind: PointerEventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            page: Point::new(x, y),
            client: Point::new(x, y),
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
            target: None,
        }
    }

    #[must_use]
    pub fn down(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Down, x, y)
    }

    #[must_use]
    pub fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Move, x, y)
    }

    #[must_use]
    pub fn up(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Up, x, y)
    }

    /// Create a pointer event with modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    /// Override the viewport coordinates (defaults to the page coordinates).
    #[must_use]
    pub fn with_client(mut self, client: Point) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn with_target(mut self, category: SelectType, id: impl Into<NodeId>) -> Self {
        self.target = Some(PointerTarget {
            category,
            id: id.into(),
        });
        self
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
}

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left mouse button / primary touch.
    Primary,

    /// Middle mouse button.
    Auxiliary,

    /// Right mouse button.
    Secondary,
}

/// Selectable node found under the pointer by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PointerTarget {
    pub category: SelectType,
    pub id: NodeId,
}

bitflags! {
    /// Modifier keys held during a pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

impl Modifiers {
    /// Ctrl or Cmd held: paint additions/removals relative to the drag start.
    #[inline]
    pub const fn toggles(&self) -> bool {
        self.intersects(Self::CTRL.union(Self::SUPER))
    }

    /// Alt held without a toggle modifier.
    #[inline]
    pub const fn subtracts(&self) -> bool {
        self.contains(Self::ALT) && !self.toggles()
    }

    #[inline]
    pub const fn extends(&self) -> bool {
        self.contains(Self::SHIFT)
    }

    /// No modifier at all: the drag replaces the selection.
    #[inline]
    pub const fn replaces(&self) -> bool {
        self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_set_fields() {
        let ev = PointerEvent::down(3.0, 4.0)
            .with_modifiers(Modifiers::SHIFT)
            .with_button(PointerButton::Secondary)
            .with_client(Point::new(1.0, 2.0))
            .with_target(SelectType::Block, "b1");

        assert_eq!(ev.kind, PointerEventKind::Down);
        assert_eq!(ev.page, Point::new(3.0, 4.0));
        assert_eq!(ev.client, Point::new(1.0, 2.0));
        assert_eq!(ev.button, PointerButton::Secondary);
        assert!(ev.modifiers.extends());
        assert_eq!(ev.target.map(|t| t.id), Some(NodeId::new("b1")));
    }

    #[test]
    fn ctrl_and_super_both_toggle() {
        assert!(Modifiers::CTRL.toggles());
        assert!(Modifiers::SUPER.toggles());
        assert!(!Modifiers::SHIFT.toggles());
    }

    #[test]
    fn alt_subtracts_only_without_toggle() {
        assert!(Modifiers::ALT.subtracts());
        assert!(!(Modifiers::ALT | Modifiers::CTRL).subtracts());
        assert!(!(Modifiers::ALT | Modifiers::SUPER).subtracts());
    }

    #[test]
    fn replace_means_no_modifier_at_all() {
        assert!(Modifiers::NONE.replaces());
        assert!(Modifiers::default().replaces());
        // Super alone is a toggle, not a replace.
        assert!(!Modifiers::SUPER.replaces());
        assert!(!Modifiers::SHIFT.replaces());
    }
}
