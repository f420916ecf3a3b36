//! Xalan engine adapter for the trace engine
//!
//! Xalan reports tracing push-style: one callback per executed stylesheet
//! element, plus selection and result-tree generation callbacks. This crate
//! models that callback surface and translates every call into exactly one
//! canonical event.

pub mod listener;
pub mod native;

// Re-export main types
pub use listener::{classify, XalanAdapter};
pub use native::{
    CloneNotSupported, GenerateEvent, GenerateEventType, NodeIterator, Selection,
    SelectionEvent, SourceNode, StyleNode, XslToken,
};
