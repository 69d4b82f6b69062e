#![forbid(unsafe_code)]

//! Core: geometry, pointer events, node identity, and frame coalescing.
//!
//! # Role in blocksel
//! `blocksel-core` holds the value types every other layer agrees on. It has
//! no knowledge of documents or selection policy; the `blocksel` crate builds
//! the drag-selection engine on top of it.
//!
//! # Primary responsibilities
//! - **Geometry**: `Rect`/`Point` in normalized space, collision rules, and
//!   the page → container coordinate mapping.
//! - **Event**: canonical pointer events and modifier flags.
//! - **Frame coalescing**: one pending evaluation per display tick.
//! - **Logging**: tracing targets and optional subscriber install.

pub mod event;
pub mod frame;
pub mod geometry;
pub mod ids;
pub mod logging;

pub use event::{Event, Modifiers, PointerButton, PointerEvent, PointerEventKind, PointerTarget};
pub use geometry::{CoordinateSpace, Point, Rect};
pub use ids::{NodeId, SelectType};
