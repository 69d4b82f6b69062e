#![forbid(unsafe_code)]

//! Side effects requested by the engine.
//!
//! The engine never touches the host directly. Each call returns the
//! effects it wants performed, in order; the host applies them. Focus
//! effects can be routed through a [`FocusSink`] with
//! [`Effect::apply_focus`].

use bitflags::bitflags;
use blocksel_core::frame::FrameTicket;
use blocksel_core::geometry::{Point, Rect};
use blocksel_core::ids::NodeId;

use crate::autoscroll::AutoScrollSignal;
use crate::provider::{CaretRange, FocusSink, Scope};
use crate::selection::SelectionSnapshot;

bitflags! {
    /// Global listeners a drag session needs while it is active.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Subscriptions: u8 {
        const POINTER_MOVE = 0b0001;
        const POINTER_UP   = 0b0010;
        const BLUR         = 0b0100;
        const SCROLL       = 0b1000;
    }
}

impl Subscriptions {
    /// Everything a drag session listens to.
    pub const SESSION: Self = Self::all();
}

/// A request from the engine to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Selection render signal. Carries every category, empty ones included.
    SelectionChanged(SelectionSnapshot),
    /// The selection was explicitly cleared.
    SelectionCleared,
    /// A drag with motion finished.
    SelectionEnd,
    /// Show the drag rectangle (normalized space) or hide it.
    DragRect(Option<Rect>),
    SetFocus { id: NodeId, range: CaretRange },
    /// Drop caret focus; `blur` also removes the live text cursor.
    ClearFocus { blur: bool },
    /// Plain click without motion: let the host place a caret in `id` at
    /// `point` (page coordinates).
    AttemptCaret { id: NodeId, point: Point },
    CloseContextMenu,
    Bind(Subscriptions),
    Unbind(Subscriptions),
    /// Call [`SelectionEngine::on_frame`](crate::engine::SelectionEngine::on_frame)
    /// with this ticket on the next display frame.
    RequestFrame(FrameTicket),
    /// A previously requested frame is void.
    CancelFrame(FrameTicket),
    AutoScroll(AutoScrollSignal),
    /// Set the scroll offset of `scope` to `top`.
    ScrollTo { scope: Scope, top: f64 },
    /// Gesture in progress; hosts use this to pause hover previews and
    /// similar UI.
    SelectingChanged(bool),
    PreviewSuppressed(bool),
}

impl Effect {
    /// Apply a focus effect to `sink`. Returns whether `self` was one.
    pub fn apply_focus(&self, sink: &mut dyn FocusSink) -> bool {
        match self {
            Self::SetFocus { id, range } => {
                sink.set_focus(id, *range);
                true
            }
            Self::ClearFocus { blur } => {
                sink.clear_focus(*blur);
                true
            }
            _ => false,
        }
    }

    pub fn is_focus(&self) -> bool {
        matches!(self, Self::SetFocus { .. } | Self::ClearFocus { .. })
    }
}

/// Route every focus effect in `effects` to `sink`, in order.
pub fn apply_focus_effects<'a>(
    effects: impl IntoIterator<Item = &'a Effect>,
    sink: &mut dyn FocusSink,
) -> usize {
    effects
        .into_iter()
        .filter(|effect| effect.apply_focus(sink))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl FocusSink for Recorder {
        fn set_focus(&mut self, id: &NodeId, range: CaretRange) {
            self.calls.push(format!("set {id} {}..{}", range.from, range.to));
        }
        fn clear_focus(&mut self, blur: bool) {
            self.calls.push(format!("clear {blur}"));
        }
    }

    #[test]
    fn session_subscribes_to_everything() {
        assert!(Subscriptions::SESSION.contains(Subscriptions::SCROLL | Subscriptions::BLUR));
    }

    #[test]
    fn only_focus_effects_reach_the_sink() {
        let effects = [
            Effect::ClearFocus { blur: true },
            Effect::SelectionCleared,
            Effect::SetFocus {
                id: "n1".into(),
                range: CaretRange::new(1, 4),
            },
            Effect::DragRect(None),
        ];
        let mut sink = Recorder::default();
        assert_eq!(apply_focus_effects(&effects, &mut sink), 2);
        assert_eq!(sink.calls, ["clear true", "set n1 1..4"]);
        assert!(effects[0].is_focus());
        assert!(!effects[1].is_focus());
    }
}
