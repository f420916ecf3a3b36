//! Engine-agnostic XSLT trace reconstruction.
//!
//! This crate defines the canonical event model every engine adapter
//! produces, the builder that turns one transformation's events into a
//! nested trace tree, and the renderer and correlator that replay a finished
//! tree as text or as checkpoint calls.

pub mod adapter;
pub mod builder;
pub mod config;
pub mod context;
pub mod correlate;
pub mod error;
pub mod escape;
pub mod event;
pub mod node;
pub mod recorder;
pub mod render;
pub mod report;
pub mod stylesheet;

pub use adapter::{EngineAdapter, EventSink, UNAVAILABLE};
pub use builder::{BuilderState, SharedTraceBuilder, TraceTreeBuilder};
pub use config::TraceConfig;
pub use context::TraceContext;
pub use correlate::{BuiltInRulePolicy, CorrelationSummary, ReportCorrelator};
pub use error::{Error, Result};
pub use event::{
    CanonicalEvent, DetailLevel, EventKind, Level, Location, OutputEvent, OutputEventKind, Tag,
};
pub use node::{NodeId, TraceNode, TraceTree};
pub use recorder::{Checkpoint, CheckpointKind, CheckpointRecorder, MemoryRecorder};
pub use render::{render, render_node_only, render_sequence, render_tree, SEPARATOR};
pub use report::TraceReport;
pub use stylesheet::{StylesheetIndex, StylesheetSource, TemplateExcerpt};

/// Replay `events` through a fresh builder and return the closed tree.
///
/// Convenience for logs and tests; engine adapters feed a builder directly.
pub fn build_tree<I>(detail_level: DetailLevel, events: I) -> Result<TraceTree>
where
    I: IntoIterator<Item = CanonicalEvent>,
{
    let mut builder = TraceTreeBuilder::new(detail_level);
    builder.open()?;
    for event in events {
        builder.accept(event)?;
    }
    Ok(builder.finish())
}
