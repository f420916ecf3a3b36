//! Saxon engine adapter for the trace engine
//!
//! Saxon reports tracing pull-style: `enter`/`leave` around traceable
//! objects, `start_current_item`/`end_current_item` around context items,
//! and a receiver for the result tree. This adapter classifies each
//! traceable once and forwards one canonical event per callback.

pub mod listener;
pub mod native;
pub mod receiver;

// Re-export main types
pub use listener::{classify, SaxonAdapter, XSLT_NAMESPACE};
pub use native::{
    ExpressionKind, Item, NodeItem, NodeKind, PropertyValue, TraceInfo, Traceable, TraceableKind,
};
