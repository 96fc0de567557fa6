//! In-memory document model for the Kassa page runtime.
//!
//! This is the dependency-injected "root UI container" the form behaviors
//! are constructed against: an arena of element nodes with id/class lookup,
//! per-element value and caret state, inline style properties, and the page
//! metrics needed for scrollbar compensation. It deliberately models only
//! what the behaviors touch; it is not a general DOM.
pub mod document;
pub mod events;

pub use document::{
    Document, DomError, Element, ElementSpec, NodeId, Overflow, PageMetrics, Result,
};
pub use events::{key_code_for, Dispatch, EventKind, PageEvent};
