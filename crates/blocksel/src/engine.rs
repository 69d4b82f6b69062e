#![forbid(unsafe_code)]

//! Drag-selection session state machine.
//!
//! [`SelectionEngine`] turns pointer, scroll and blur events into
//! [`Effect`]s. It follows the recognizer pattern: one `process` call per
//! input event, returning what the host should do, with no reference to the
//! host kept between calls.
//!
//! # State machine
//!
//! ```text
//!   Idle ──pointer-down──► Dragging ──pointer-up / blur──► Idle
//!                             │  ▲
//!                  shift-click│  │range resolved
//!                             ▼  │
//!                          Extending
//! ```
//!
//! # Invariants
//!
//! 1. At most one session is active. A pointer-down while dragging is
//!    ignored.
//! 2. Moves are coalesced: at most one frame is outstanding and it evaluates
//!    the latest move. Scroll, pointer-up and blur evaluate a pending move
//!    first, so the final selection never lags the last pointer position.
//! 3. Every session ends with the rectangle hidden, listeners unbound and
//!    auto-scroll stopped, whatever path ended it.
//! 4. The stored block selection is canonical: no id is stored together with
//!    one of its ancestors.

use blocksel_core::event::{
    Event, Modifiers, PointerButton, PointerEvent, PointerEventKind, PointerTarget,
};
use blocksel_core::frame::{FrameCoalescer, FrameTicket};
use blocksel_core::geometry::{CoordinateSpace, Point, Rect};
use blocksel_core::ids::{NodeId, SelectType};
use blocksel_core::logging::TARGET_SESSION;
use web_time::Instant;

use crate::autoscroll::{reveal_offset, AutoScrollSignal, RevealDirection};
use crate::config::SelectionConfig;
use crate::drag::{DragTracker, IndexAction};
use crate::effect::{Effect, Subscriptions};
use crate::error;
use crate::focus::{FocusReconciler, FrameMode};
use crate::hit_test;
use crate::node_index::{Hierarchy, NodeIndex};
use crate::provider::{FocusState, Host, Scope, ViewportProvider};
use crate::selection::{SelectionSet, SelectionSnapshot};

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Dragging,
    /// Resolving a shift-click range; only observable while the engine is
    /// inside that step.
    Extending,
}

/// Everything scoped to one gesture.
#[derive(Debug)]
struct DragSession {
    scope: Scope,
    tracker: DragTracker,
    index: NodeIndex,
    ids_on_start: SelectionSet,
    anchor_page: Point,
    modifiers: Modifiers,
    reconciler: FocusReconciler,
}

/// The drag multi-select engine.
#[derive(Debug)]
pub struct SelectionEngine {
    config: SelectionConfig,
    selection: SelectionSet,
    /// Descendant closure from the most recent index, kept between sessions
    /// for materialization.
    hierarchy: Hierarchy,
    state: SessionState,
    session: Option<DragSession>,
    frames: FrameCoalescer<PointerEvent>,
    bound: Subscriptions,
    selection_disabled: bool,
    clear_disabled: bool,
    overlay_open: bool,
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new(SelectionConfig::default())
    }
}

impl SelectionEngine {
    /// Engine with a validated configuration.
    pub fn try_new(config: SelectionConfig) -> error::Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Engine with `config` as given; callers loading untrusted values
    /// should use [`SelectionEngine::try_new`].
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            config,
            selection: SelectionSet::new(),
            hierarchy: Hierarchy::default(),
            state: SessionState::Idle,
            session: None,
            frames: FrameCoalescer::new(),
            bound: Subscriptions::empty(),
            selection_disabled: false,
            clear_disabled: false,
            overlay_open: false,
        }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_selecting(&self) -> bool {
        self.session.is_some()
    }

    /// Listeners currently requested via [`Effect::Bind`].
    pub fn subscriptions(&self) -> Subscriptions {
        self.bound
    }

    /// Stored (canonical) selection.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        self.selection.snapshot(&self.hierarchy)
    }

    /// Frames scheduled and superseded before running, over the engine's
    /// lifetime.
    pub fn coalesced_frames(&self) -> u64 {
        self.frames.coalesced_count()
    }

    // --- flags ---------------------------------------------------------

    /// Disable drag selection. An active session is abandoned, keeping the
    /// selection it had built so far.
    pub fn set_selection_disabled(&mut self, disabled: bool) -> Vec<Effect> {
        self.selection_disabled = disabled;
        let mut out = Vec::new();
        if disabled && let Some(session) = self.session.take() {
            tracing::debug!(target: TARGET_SESSION, "selection disabled mid-drag");
            self.teardown(session, &mut out);
        }
        out
    }

    /// Keep the selection on a plain click instead of clearing it.
    pub fn set_clear_disabled(&mut self, disabled: bool) {
        self.clear_disabled = disabled;
    }

    /// A modal overlay that swallows pointer input is open; pointer-downs
    /// do not start sessions.
    pub fn set_overlay_open(&mut self, open: bool) {
        self.overlay_open = open;
    }

    // --- event entry points -------------------------------------------

    /// Feed one input event.
    pub fn process<H: Host>(&mut self, event: &Event, host: &H) -> Vec<Effect> {
        match event {
            Event::Pointer(pointer) => match pointer.kind {
                PointerEventKind::Down => self.start(pointer, host),
                PointerEventKind::Move => self.on_move(pointer),
                PointerEventKind::Up => self.on_up(pointer, host),
            },
            Event::Scroll => self.on_scroll(host),
            Event::Blur => self.on_blur(host),
        }
    }

    /// Run the frame requested with `ticket`. Stale tickets do nothing.
    pub fn on_frame<H: Host>(&mut self, ticket: FrameTicket, host: &H) -> Vec<Effect> {
        match self.frames.take(ticket) {
            Some(pointer) => self.evaluate_move(&pointer, host),
            None => Vec::new(),
        }
    }

    /// Start a session from a pointer-down.
    ///
    /// Ignored for non-primary buttons, while an overlay is open, and while a
    /// session is already running. With selection disabled the rectangle is
    /// hidden instead.
    pub fn start<H: Host>(&mut self, event: &PointerEvent, host: &H) -> Vec<Effect> {
        if self.session.is_some() {
            tracing::trace!(target: TARGET_SESSION, "start ignored: session active");
            return Vec::new();
        }
        if event.button != PointerButton::Primary || self.overlay_open {
            return Vec::new();
        }
        if self.selection_disabled {
            return vec![Effect::DragRect(None)];
        }

        let mut out = Vec::new();
        let scope = host.active_scope();
        let scroll_top = host.scroll_top(scope);
        let space = space_of(host, scope);
        let focus = host.focus();

        let tracker = DragTracker::start(
            event.page,
            event.client,
            scroll_top,
            space,
            self.config.drag_threshold,
            self.config.rebuild_fraction,
        );
        let index = NodeIndex::build(host, scope, tracker.space_at(scroll_top));
        let ids_on_start = self.selection.clone();

        if event.modifiers.extends()
            && self.seed_from_focus(event.target.as_ref(), focus.as_ref())
        {
            out.push(Effect::SelectionChanged(self.selection.snapshot(index.hierarchy())));
        }

        self.bound = Subscriptions::SESSION;
        out.push(Effect::Bind(self.bound));
        out.push(Effect::SelectingChanged(true));
        out.push(Effect::PreviewSuppressed(true));
        out.push(Effect::AutoScroll(AutoScrollSignal::Start {
            scope,
            client: event.client,
        }));

        let mut reconciler = FocusReconciler::new();
        reconciler.begin(focus.as_ref(), &mut out);

        tracing::debug!(
            target: TARGET_SESSION,
            scope = ?scope,
            nodes = index.len(),
            modifiers = ?event.modifiers,
            "drag session started"
        );

        self.session = Some(DragSession {
            scope,
            tracker,
            index,
            ids_on_start,
            anchor_page: event.page,
            modifiers: event.modifiers,
            reconciler,
        });
        self.state = SessionState::Dragging;
        out
    }

    /// Shift-press into an empty category seeds it with the focused node so
    /// the release can extend a range from it.
    fn seed_from_focus(
        &mut self,
        target: Option<&PointerTarget>,
        focus: Option<&FocusState>,
    ) -> bool {
        let (Some(target), Some(focus)) = (target, focus) else {
            return false;
        };
        if target.category != SelectType::Block
            || !self.selection.get(target.category).is_empty()
            || target.id == focus.node_id
        {
            return false;
        }
        self.selection.insert(target.category, focus.node_id.clone())
    }

    fn on_move(&mut self, event: &PointerEvent) -> Vec<Effect> {
        if self.session.is_none() {
            return Vec::new();
        }
        if self.selection_disabled {
            return self.set_selection_disabled(true);
        }

        let scheduled = self.frames.schedule(event.clone(), Instant::now());
        let mut out = Vec::with_capacity(2);
        if let Some(old) = scheduled.cancelled {
            out.push(Effect::CancelFrame(old));
        }
        out.push(Effect::RequestFrame(scheduled.ticket));
        out
    }

    /// Evaluate a pending move immediately, voiding its frame. Returns
    /// whether a frame was published.
    fn flush_pending<H: Host>(&mut self, host: &H, out: &mut Vec<Effect>) -> bool {
        let ticket = self.frames.pending_ticket();
        let Some(pointer) = self.frames.flush() else {
            return false;
        };
        if let Some(ticket) = ticket {
            out.push(Effect::CancelFrame(ticket));
        }
        let frame = self.evaluate_move(&pointer, host);
        let rendered = frame
            .iter()
            .any(|effect| matches!(effect, Effect::SelectionChanged(_)));
        out.extend(frame);
        rendered
    }

    fn evaluate_move<H: Host>(&mut self, event: &PointerEvent, host: &H) -> Vec<Effect> {
        let mut out = Vec::new();
        let Some(session) = self.session.as_mut() else {
            return out;
        };
        session.modifiers = event.modifiers;

        let scroll_top = host.scroll_top(session.scope);
        let Some(rect) = session.tracker.update(event.page, event.client, scroll_top) else {
            return out;
        };

        self.run_frame(rect, event.page, host, &mut out);
        out.push(Effect::AutoScroll(AutoScrollSignal::Track {
            client: event.client,
        }));
        out
    }

    fn on_scroll<H: Host>(&mut self, host: &H) -> Vec<Effect> {
        let mut out = Vec::new();
        self.flush_pending(host, &mut out);

        let Some(session) = self.session.as_mut() else {
            return out;
        };
        let scroll_top = host.scroll_top(session.scope);
        let viewport_height = host.viewport_height(session.scope);
        let Some(step) = session.tracker.on_scroll(scroll_top, viewport_height) else {
            return out;
        };

        let space = session.tracker.space_at(scroll_top);
        match step.index {
            IndexAction::Refresh => session.index.refresh_boxes(host, space),
            IndexAction::Rebuild => session.index = NodeIndex::build(host, session.scope, space),
        }
        let client = session.tracker.last_client();

        self.run_frame(step.rect, step.page, host, &mut out);
        out.push(Effect::AutoScroll(AutoScrollSignal::Track { client }));
        out
    }

    /// Hit test `rect`, reconcile focus and publish the frame.
    fn run_frame<H: Host>(&mut self, rect: Rect, page: Point, host: &H, out: &mut Vec<Effect>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let frame = hit_test::evaluate_frame(
            &rect,
            &session.index,
            session.modifiers,
            &session.ids_on_start,
            &self.selection,
        );
        let mut working = frame.selection;
        let mode = session.reconciler.reconcile(
            &mut working,
            session.modifiers,
            frame.blocks,
            host,
            session.anchor_page,
            page,
            out,
        );
        self.selection = working;

        let visible = mode == FrameMode::Blocks && !host.has_text_range();
        out.push(Effect::DragRect(visible.then_some(rect)));
        out.push(Effect::SelectionChanged(
            self.selection.snapshot(session.index.hierarchy()),
        ));
    }

    fn on_up<H: Host>(&mut self, event: &PointerEvent, host: &H) -> Vec<Effect> {
        let mut out = Vec::new();
        let rendered = self.flush_pending(host, &mut out);
        if let Some(session) = self.session.take() {
            self.finish(session, event, rendered, host, &mut out);
        }
        out
    }

    /// Window blur ends the gesture like a pointer-up at the last known
    /// position with no modifiers held.
    fn on_blur<H: Host>(&mut self, host: &H) -> Vec<Effect> {
        let mut out = Vec::new();
        let rendered = self.flush_pending(host, &mut out);
        if let Some(session) = self.session.take() {
            let last = session.tracker.last_page();
            let event = PointerEvent::up(last.x, last.y).with_client(session.tracker.last_client());
            tracing::debug!(target: TARGET_SESSION, "window blurred mid-drag");
            self.finish(session, &event, rendered, host, &mut out);
        }
        out
    }

    /// `rendered` is set when a flushed move already published this
    /// release's frame.
    fn finish<H: Host>(
        &mut self,
        session: DragSession,
        event: &PointerEvent,
        rendered: bool,
        host: &H,
        out: &mut Vec<Effect>,
    ) {
        if session.tracker.has_moved() {
            if !rendered {
                out.push(Effect::SelectionChanged(
                    self.selection.snapshot(session.index.hierarchy()),
                ));
            }
            out.push(Effect::SelectionEnd);
        } else if event.modifiers.replaces() {
            if !self.clear_disabled {
                self.selection.clear();
                out.push(Effect::SelectionChanged(
                    self.selection.snapshot(session.index.hierarchy()),
                ));
                out.push(Effect::SelectionCleared);
            }
            FocusReconciler::plain_click(event.target.as_ref(), event.page, out);
        } else if self.click_with_modifiers(&session, event, host) {
            out.push(Effect::SelectionChanged(
                self.selection.snapshot(session.index.hierarchy()),
            ));
        }

        session.reconciler.finish(&self.selection, out);
        tracing::debug!(
            target: TARGET_SESSION,
            moved = session.tracker.has_moved(),
            blocks = self.selection.len(SelectType::Block),
            records = self.selection.len(SelectType::Record),
            "drag session finished"
        );
        self.teardown(session, out);
    }

    /// Toggle and range-extend clicks. Returns whether the selection changed.
    fn click_with_modifiers<H: Host>(
        &mut self,
        session: &DragSession,
        event: &PointerEvent,
        host: &H,
    ) -> bool {
        let Some(target) = event.target.as_ref() else {
            return false;
        };
        let before = self.selection.clone();

        if event.modifiers.toggles() && !session.ids_on_start.is_empty() {
            if session.ids_on_start.contains(target.category, &target.id) {
                self.selection.remove(target.category, &target.id);
            } else {
                self.selection.insert(target.category, target.id.clone());
            }
        }

        if event.modifiers.extends() && target.category == SelectType::Block {
            self.state = SessionState::Extending;
            let blocks =
                self.selection
                    .materialize(SelectType::Block, true, session.index.hierarchy());
            if let Some(anchor) = blocks.first() {
                let range = host.range_between(anchor, &target.id);
                tracing::trace!(
                    target: TARGET_SESSION,
                    anchor = %anchor,
                    to = %target.id,
                    len = range.len(),
                    "range extend"
                );
                self.selection.extend(SelectType::Block, range);
            }
            self.state = SessionState::Dragging;
        }

        self.selection.canonicalize(session.index.hierarchy());
        self.selection != before
    }

    /// End-of-session cleanup shared by every exit path.
    fn teardown(&mut self, session: DragSession, out: &mut Vec<Effect>) {
        if let Some(ticket) = self.frames.cancel() {
            out.push(Effect::CancelFrame(ticket));
        }
        out.push(Effect::DragRect(None));
        out.push(Effect::AutoScroll(AutoScrollSignal::Stop));
        if !self.bound.is_empty() {
            out.push(Effect::Unbind(self.bound));
            self.bound = Subscriptions::empty();
        }
        out.push(Effect::SelectingChanged(false));
        out.push(Effect::PreviewSuppressed(false));

        self.hierarchy = session.index.into_hierarchy();
        self.state = SessionState::Idle;
    }

    // --- programmatic access ------------------------------------------

    /// Replace the ids of `category`.
    pub fn set(
        &mut self,
        category: SelectType,
        ids: impl IntoIterator<Item = NodeId>,
    ) -> Vec<Effect> {
        self.selection.set(category, ids);
        self.selection.canonicalize(&self.hierarchy);
        vec![Effect::SelectionChanged(self.snapshot())]
    }

    /// Materialized ids of `category`.
    pub fn get(&self, category: SelectType, with_children: bool) -> Vec<NodeId> {
        self.selection.materialize(category, with_children, &self.hierarchy)
    }

    /// Whether `id` is selected, directly or through a selected ancestor.
    pub fn is_selected(&self, category: SelectType, id: &NodeId) -> bool {
        self.selection.get(category).iter().any(|selected| {
            selected == id
                || (category.is_hierarchical()
                    && self.hierarchy.is_descendant_of(id.as_str(), selected.as_str()))
        })
    }

    /// Clear every category. Ends an active session. Emits the render and
    /// clear signals on every call, even when already empty.
    pub fn clear(&mut self) -> Vec<Effect> {
        let mut out = Vec::new();
        if let Some(session) = self.session.take() {
            self.teardown(session, &mut out);
        }
        self.selection.clear();
        out.push(Effect::SelectionChanged(self.snapshot()));
        out.push(Effect::SelectionCleared);
        out
    }

    /// Scroll `id` into view when moving in `direction` (keyboard
    /// navigation across a selection). `None` when it is already visible or
    /// not laid out.
    pub fn reveal<H: Host>(
        &self,
        id: &NodeId,
        direction: RevealDirection,
        host: &H,
    ) -> Option<Effect> {
        let scope = host.active_scope();
        let scroll_top = host.scroll_top(scope);
        let rect = space_of(host, scope)
            .with_scroll(scroll_top)
            .rect_to_local(host.rect_of(scope, id)?);
        let top = reveal_offset(
            rect,
            direction,
            scroll_top,
            host.viewport_height(scope),
            self.config.header_height,
        )?;
        Some(Effect::ScrollTo { scope, top })
    }
}

/// Coordinate space of `scope`, before applying a scroll offset.
fn space_of(viewport: &dyn ViewportProvider, scope: Scope) -> CoordinateSpace {
    if scope.is_popup() {
        CoordinateSpace::overlay(viewport.container_offset(scope), 0.0)
    } else {
        CoordinateSpace::PAGE
    }
}
