#![forbid(unsafe_code)]

//! Reconciles caret focus with an in-progress block selection.
//!
//! One [`FocusReconciler`] lives per drag session.
//!
//! # Rules
//!
//! 1. A drag starting while a caret is active clears it.
//! 2. A frame that selects several blocks (or toggles anything) clears focus,
//!    at most once per session unless focus was re-established in between.
//! 3. A frame that selects exactly one block without the toggle modifier
//!    turns into text selection inside that block when the pointer resolves
//!    to a caret there: the block selection is suppressed and focus spans
//!    from the session's caret anchor to the pointer.
//! 4. Releasing with blocks selected blurs focus and closes the context menu.

use blocksel_core::event::{Modifiers, PointerTarget};
use blocksel_core::geometry::Point;
use blocksel_core::ids::{NodeId, SelectType};
use blocksel_core::logging::TARGET_SESSION;

use crate::effect::Effect;
use crate::provider::{CaretRange, FocusProvider, FocusState};
use crate::selection::SelectionSet;

/// How a frame's selection ended up being presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    /// Block highlights.
    Blocks,
    /// Text selection inside a single block.
    Text,
}

#[derive(Debug, Clone, Default)]
pub struct FocusReconciler {
    cleared: bool,
    anchor: Option<(NodeId, CaretRange)>,
    last_set: Option<(NodeId, CaretRange)>,
}

impl FocusReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drag start.
    pub fn begin(&mut self, focus: Option<&FocusState>, out: &mut Vec<Effect>) {
        if focus.is_some() {
            out.push(Effect::ClearFocus { blur: true });
            self.cleared = true;
        }
    }

    /// Apply rules 2 and 3 to the working set of one frame.
    ///
    /// `block_hits` counts the frame's blocks before canonicalization, so a
    /// parent covered together with its child is not a single block.
    /// `anchor_page` is where the gesture started and `page` where the
    /// pointer is now, both in page coordinates.
    #[allow(clippy::too_many_arguments)]
    pub fn reconcile(
        &mut self,
        working: &mut SelectionSet,
        modifiers: Modifiers,
        block_hits: usize,
        focus: &dyn FocusProvider,
        anchor_page: Point,
        page: Point,
        out: &mut Vec<Effect>,
    ) -> FrameMode {
        if block_hits == 1
            && !modifiers.toggles()
            && let [id] = working.get(SelectType::Block)
        {
            let id = id.clone();
            if let Some(range) = self.caret_span(&id, focus, anchor_page, page) {
                working.clear_category(SelectType::Block);
                if self.last_set.as_ref() != Some(&(id.clone(), range)) {
                    tracing::trace!(target: TARGET_SESSION, id = %id, ?range, "caret re-entry");
                    out.push(Effect::SetFocus {
                        id: id.clone(),
                        range,
                    });
                    self.last_set = Some((id, range));
                }
                self.cleared = false;
                return FrameMode::Text;
            }
            return FrameMode::Blocks;
        }

        let nontrivial = block_hits > 1 || (modifiers.toggles() && !working.is_empty());
        if nontrivial && !self.cleared {
            out.push(Effect::ClearFocus { blur: true });
            self.cleared = true;
            self.last_set = None;
        }
        FrameMode::Blocks
    }

    /// Caret range from the session anchor to `page`, or `None` when the
    /// pointer is outside `id`'s text.
    fn caret_span(
        &mut self,
        id: &NodeId,
        focus: &dyn FocusProvider,
        anchor_page: Point,
        page: Point,
    ) -> Option<CaretRange> {
        let here = focus.resolve_caret_at_point(id, page)?;
        let anchor = match &self.anchor {
            Some((anchor_id, range)) if anchor_id == id => *range,
            _ => {
                let range = focus.resolve_caret_at_point(id, anchor_page).unwrap_or(here);
                self.anchor = Some((id.clone(), range));
                range
            }
        };
        Some(anchor.span(&here))
    }

    /// Rule 4, on release.
    pub fn finish(&self, selection: &SelectionSet, out: &mut Vec<Effect>) {
        if !selection.get(SelectType::Block).is_empty() {
            out.push(Effect::ClearFocus { blur: true });
            out.push(Effect::CloseContextMenu);
        }
    }

    /// Plain click without motion: hand caret placement back to the host.
    pub fn plain_click(target: Option<&PointerTarget>, page: Point, out: &mut Vec<Effect>) {
        if let Some(target) = target.filter(|t| t.category == SelectType::Block) {
            out.push(Effect::AttemptCaret {
                id: target.id.clone(),
                point: page,
            });
        }
    }
}
