#![forbid(unsafe_code)]

//! Spatial multi-select for block documents.
//!
//! # Role in blocksel
//! `blocksel` is the drag-selection engine. A host UI forwards pointer,
//! scroll and blur events into [`SelectionEngine`], answers geometry and
//! focus queries through the [`provider`] traits, and applies the
//! [`Effect`]s it gets back.
//!
//! # Primary responsibilities
//! - **NodeIndex**: per-session snapshot of selectable nodes, their boxes and
//!   descendant closure.
//! - **DragTracker**: anchor/current geometry, motion threshold, scroll
//!   compensation.
//! - **Hit testing**: rectangle collision plus the Shift/Ctrl/Alt policy.
//! - **SelectionSet**: canonical per-category ids, materialized on demand.
//! - **FocusReconciler**: caret focus vs. block selection.
//! - **Auto-scroll**: edge scrolling signals and scroll-into-view.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut engine = SelectionEngine::default();
//! for effect in engine.process(&Event::Pointer(PointerEvent::down(10.0, 10.0)), &host) {
//!     host.apply(effect);
//! }
//! ```

pub mod autoscroll;
pub mod config;
pub mod drag;
pub mod effect;
pub mod engine;
pub mod error;
pub mod focus;
pub mod node_index;
pub mod provider;
pub mod selection;

pub use blocksel_core::{
    CoordinateSpace, Event, Modifiers, NodeId, Point, PointerButton, PointerEvent,
    PointerEventKind, PointerTarget, Rect, SelectType,
};
pub use blocksel_core::frame::FrameTicket;

pub use autoscroll::{AutoScrollSignal, EdgeScroller, RevealDirection};
pub use config::{AutoScrollConfig, SelectionConfig};
pub use effect::{Effect, Subscriptions};
pub use engine::{SelectionEngine, SessionState};
pub use error::ConfigError;
pub use provider::{
    CaretRange, FocusProvider, FocusSink, FocusState, Host, Scope, SelectableNode, TreeProvider,
    ViewportProvider,
};
pub use selection::{SelectionSet, SelectionSnapshot};

/// Install a global tracing subscriber. See [`blocksel_core::logging::init`].
#[cfg(feature = "tracing-json")]
pub use blocksel_core::logging::{init as init_logging, LogFormat};
