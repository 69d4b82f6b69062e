#![forbid(unsafe_code)]

//! Host-side collaborators the engine reads from.
//!
//! The engine never holds a reference to a presentation tree. Everything it
//! knows about the document arrives through these traits, implemented by the
//! host UI layer (or by a fixture in tests). Focus *mutations* flow the other
//! way, as [`Effect`](crate::effect::Effect)s applied through [`FocusSink`].

use blocksel_core::geometry::{Point, Rect};
use blocksel_core::ids::{NodeId, SelectType};

/// Which scroll container a gesture happens in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// Main editor canvas; pointer page coordinates are already document-relative.
    #[default]
    Page,
    /// A scrollable overlay (popup) with its own offset and scroll position.
    Popup,
}

impl Scope {
    pub const fn is_popup(&self) -> bool {
        matches!(self, Self::Popup)
    }
}

/// A selectable unit as reported by the tree provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectableNode {
    pub id: NodeId,
    pub category: SelectType,
    /// Page-space box, `None` when the node is not laid out.
    pub rect: Option<Rect>,
    /// The node has child nodes in the document tree.
    pub has_children: bool,
    /// A container whose internal cells are not independently selectable
    /// (tables). Its descendant closure is always empty.
    pub atomic: bool,
}

impl SelectableNode {
    pub fn new(category: SelectType, id: impl Into<NodeId>, rect: Rect) -> Self {
        Self {
            id: id.into(),
            category,
            rect: Some(rect),
            has_children: false,
            atomic: false,
        }
    }

    #[must_use]
    pub fn with_children(mut self) -> Self {
        self.has_children = true;
        self
    }

    #[must_use]
    pub fn atomic(mut self) -> Self {
        self.atomic = true;
        self
    }
}

/// Document tree access.
pub trait TreeProvider {
    /// Every node tagged selectable inside `scope`, in document order.
    fn selectable_nodes(&self, scope: Scope) -> Vec<SelectableNode>;

    /// Current page-space box of `id`, `None` if it vanished from the live tree.
    fn rect_of(&self, scope: Scope, id: &NodeId) -> Option<Rect>;

    /// Direct children of `id` in document order.
    fn child_ids(&self, id: &NodeId) -> Vec<NodeId>;

    /// Whether `id` is an atomic container (see [`SelectableNode::atomic`]).
    fn is_atomic(&self, id: &NodeId) -> bool;

    /// All selectable block ids of the current document, flattened in visible
    /// document order.
    fn document_order(&self) -> Vec<NodeId>;

    /// Selectable block ids between `a` and `b` inclusive, in document order.
    ///
    /// Order-independent: whichever id comes first is the range start. Empty
    /// when either id is not part of the document.
    fn range_between(&self, a: &NodeId, b: &NodeId) -> Vec<NodeId> {
        let order = self.document_order();
        let (Some(ia), Some(ib)) = (
            order.iter().position(|id| id == a),
            order.iter().position(|id| id == b),
        ) else {
            return Vec::new();
        };
        let (start, end) = if ia <= ib { (ia, ib) } else { (ib, ia) };
        order[start..=end].to_vec()
    }
}

/// Scroll container geometry.
pub trait ViewportProvider {
    /// Scope that currently owns pointer input (popup when one is open).
    fn active_scope(&self) -> Scope;

    fn scroll_top(&self, scope: Scope) -> f64;

    fn viewport_height(&self, scope: Scope) -> f64;

    /// Page offset of the scroll container; only meaningful for popups.
    fn container_offset(&self, scope: Scope) -> Point;
}

/// Caret range inside a node's text, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaretRange {
    pub from: usize,
    pub to: usize,
}

impl CaretRange {
    pub const fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// Collapsed caret at `at`.
    pub const fn caret(at: usize) -> Self {
        Self { from: at, to: at }
    }

    pub const fn is_collapsed(&self) -> bool {
        self.from == self.to
    }

    /// Smallest range covering both.
    #[must_use]
    pub fn span(&self, other: &CaretRange) -> CaretRange {
        CaretRange::new(
            self.from.min(self.to).min(other.from.min(other.to)),
            self.from.max(self.to).max(other.from.max(other.to)),
        )
    }
}

/// Snapshot of the editor's caret focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusState {
    pub node_id: NodeId,
    pub range: CaretRange,
}

/// Read access to caret focus.
pub trait FocusProvider {
    fn focus(&self) -> Option<FocusState>;

    /// A native text range is currently selected somewhere in the page.
    fn has_text_range(&self) -> bool {
        false
    }

    /// Caret position under `point` (page coordinates) inside `id`'s text, or
    /// `None` when the point is outside every text run of that node.
    fn resolve_caret_at_point(&self, id: &NodeId, point: Point) -> Option<CaretRange>;
}

/// Write access to caret focus, used by [`Effect::apply_focus`](crate::effect::Effect::apply_focus).
pub trait FocusSink {
    fn set_focus(&mut self, id: &NodeId, range: CaretRange);

    /// Drop caret focus; `blur` also removes the live text cursor.
    fn clear_focus(&mut self, blur: bool);
}

/// Everything the engine reads from the host in one bound.
pub trait Host: TreeProvider + ViewportProvider + FocusProvider {}

impl<T: TreeProvider + ViewportProvider + FocusProvider> Host for T {}
