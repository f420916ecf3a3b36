//! Trace tree builder
//!
//! The builder drives one [`TraceContext`] through
//! `Idle -> Open -> (enter/leave)* -> Closed`. It is the only code that
//! mutates a context, and it applies the detail-level filter: an enter above
//! the threshold pushes a filtered frame, so its leave becomes a no-op
//! without the filter ever being evaluated twice.

use std::fmt::Write as _;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::adapter::EventSink;
use crate::context::{Popped, TraceContext};
use crate::error::{Error, Result};
use crate::escape::{escape_attribute, escape_expression};
use crate::event::{CanonicalEvent, DetailLevel, EventKind, Location, OutputEvent, Tag};
use crate::node::{TraceNode, TraceTree};

const INDENT: &str = "  ";

/// Lifecycle state of a builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    Idle,
    Open,
    Closed,
}

/// Builds the trace tree of a single transformation.
#[derive(Debug)]
pub struct TraceTreeBuilder {
    detail_level: DetailLevel,
    context: Option<TraceContext>,
    tree: Option<TraceTree>,
}

impl TraceTreeBuilder {
    /// Create an idle builder; the detail level is fixed from here on
    pub fn new(detail_level: DetailLevel) -> Self {
        Self {
            detail_level,
            context: None,
            tree: None,
        }
    }

    pub fn detail_level(&self) -> DetailLevel {
        self.detail_level
    }

    pub fn state(&self) -> BuilderState {
        match (&self.context, &self.tree) {
            (_, Some(_)) => BuilderState::Closed,
            (Some(_), None) => BuilderState::Open,
            (None, None) => BuilderState::Idle,
        }
    }

    /// The open context, if any
    pub fn context(&self) -> Option<&TraceContext> {
        self.context.as_ref()
    }

    /// The finished tree, once closed
    pub fn tree(&self) -> Option<&TraceTree> {
        self.tree.as_ref()
    }

    /// Create the context and push the root.
    ///
    /// Opening an already open builder is a no-op; a closed one cannot be
    /// reopened.
    pub fn open(&mut self) -> Result<()> {
        if self.tree.is_some() {
            return Err(Error::ContextClosed);
        }
        if self.context.is_none() {
            debug!(detail = ?self.detail_level, "opening trace context");
            self.context = Some(TraceContext::new(self.detail_level));
        }
        Ok(())
    }

    /// Force-close remaining frames and freeze the tree.
    ///
    /// Safe to call after an aborted transformation, and more than once.
    pub fn close(&mut self) -> &TraceTree {
        let detail_level = self.detail_level;
        let context = &mut self.context;
        self.tree.get_or_insert_with(|| {
            freeze(
                context
                    .take()
                    .unwrap_or_else(|| TraceContext::new(detail_level)),
            )
        })
    }

    /// Close if needed and hand out the tree
    pub fn finish(self) -> TraceTree {
        match (self.tree, self.context) {
            (Some(tree), _) => tree,
            (None, Some(context)) => freeze(context),
            (None, None) => freeze(TraceContext::new(self.detail_level)),
        }
    }

    fn context_mut(&mut self) -> Result<&mut TraceContext> {
        if self.tree.is_some() {
            return Err(Error::ContextClosed);
        }
        if self.context.is_none() {
            debug!("event before open; opening implicitly");
        }
        let detail_level = self.detail_level;
        Ok(self
            .context
            .get_or_insert_with(|| TraceContext::new(detail_level)))
    }

    fn on_enter(&mut self, event: CanonicalEvent) -> Result<()> {
        let context = self.context_mut()?;
        if !context.detail_level().admits(event.level) {
            trace!(tag = %event.tag, level = ?event.level, "enter filtered");
            context.push_filtered();
            return Ok(());
        }

        let depth = context.next_depth();
        let id = context.allocate_id();
        let raw_text = opening_text(&event, depth);
        let is_template = event.tag.is_template();
        debug!(%id, tag = %event.tag, depth, "enter");

        context.push_node(TraceNode {
            id,
            tag: event.tag,
            name: event.name,
            match_expression: if is_template {
                event.match_expression
            } else {
                None
            },
            location: event.location,
            built_in: event.built_in,
            selected_node: None,
            raw_text,
            depth,
            children: Vec::new(),
        });
        Ok(())
    }

    fn on_leave(&mut self) -> Result<()> {
        let context = self.context_mut()?;
        match context.pop() {
            Popped::Node(id) => debug!(%id, "leave"),
            Popped::Filtered => trace!("leave of filtered enter"),
            Popped::Unmatched => warn!("leave without a matching enter; tree marked truncated"),
        }
        Ok(())
    }

    fn on_selection(&mut self, event: CanonicalEvent) -> Result<()> {
        let context = self.context_mut()?;
        match context.top_mut() {
            Some(node) => {
                trace!(id = %node.id, selected = ?event.selected_node, "selection");
                node.selected_node = event.selected_node;
            }
            None => trace!("selection with no open node ignored"),
        }
        Ok(())
    }

    fn on_generated(&mut self, event: CanonicalEvent) -> Result<()> {
        let context = self.context_mut()?;
        if !context.detail_level().admits(event.level) {
            trace!("generated output filtered");
            return Ok(());
        }
        if let Some(output) = &event.output {
            let owner = context.current_mut();
            let line = output_text(output, owner.depth);
            owner.raw_text.push_str(&line);
        }
        Ok(())
    }
}

fn freeze(context: TraceContext) -> TraceTree {
    let (tree, forced) = context.into_tree();
    if tree.is_truncated() {
        warn!(forced, "trace closed with unbalanced nesting; tree marked truncated");
    }
    debug!(nodes = tree.node_count(), "trace context closed");
    tree
}

impl EventSink for TraceTreeBuilder {
    fn accept(&mut self, event: CanonicalEvent) -> Result<()> {
        if self.tree.is_some() {
            return Err(Error::ContextClosed);
        }
        match event.kind {
            EventKind::DocumentEnter => {
                let context = self.context_mut()?;
                context.add_engine_attributes(&event.attributes);
                Ok(())
            }
            EventKind::DocumentLeave => {
                self.close();
                Ok(())
            }
            EventKind::TemplateEnter | EventKind::InstructionEnter => self.on_enter(event),
            EventKind::Leave => self.on_leave(),
            EventKind::Selection => self.on_selection(event),
            EventKind::SelectionEnd => {
                trace!("selection end");
                Ok(())
            }
            EventKind::GeneratedOutput => self.on_generated(event),
        }
    }
}

/// A builder behind a single lock, for the rare case where several threads
/// feed the same context. The lock guards every stack and children mutation.
#[derive(Debug, Clone)]
pub struct SharedTraceBuilder {
    inner: Arc<Mutex<TraceTreeBuilder>>,
}

impl SharedTraceBuilder {
    pub fn new(detail_level: DetailLevel) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TraceTreeBuilder::new(detail_level))),
        }
    }

    pub fn state(&self) -> BuilderState {
        self.inner.lock().state()
    }

    pub fn open(&self) -> Result<()> {
        self.inner.lock().open()
    }

    /// Close and return a copy of the frozen tree
    pub fn close(&self) -> TraceTree {
        self.inner.lock().close().clone()
    }
}

impl EventSink for SharedTraceBuilder {
    fn accept(&mut self, event: CanonicalEvent) -> Result<()> {
        self.inner.lock().accept(event)
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn push_location(out: &mut String, location: &Location) {
    match location.module() {
        Some(module) => {
            let _ = write!(out, " line=\"{}\"", location.line);
            if location.column >= 0 {
                let _ = write!(out, " column=\"{}\"", location.column);
            }
            let _ = write!(out, " module=\"{}\"", escape_attribute(module));
        }
        None => out.push_str(" location=\"unknown\""),
    }
}

/// Opening line of a node at `depth`
fn opening_text(event: &CanonicalEvent, depth: usize) -> String {
    let mut out = String::new();
    indent(&mut out, depth.saturating_sub(1));
    out.push('<');
    out.push_str(&escape_attribute(
        event.tag.element_name(event.name.as_deref()),
    ));

    let identity_key = match event.tag {
        Tag::TemplateMatch => Some("match"),
        Tag::NamedTemplate => Some("name"),
        _ => None,
    };
    if let (Some(key), Some(value)) = (identity_key, &event.match_expression) {
        let _ = write!(out, " {}=\"{}\"", key, escape_expression(value));
    }
    if event.built_in {
        out.push_str(" built-in=\"true\"");
    }
    for (key, value) in &event.attributes {
        if Some(key.as_str()) == identity_key {
            continue;
        }
        let _ = write!(
            out,
            " {}=\"{}\"",
            escape_attribute(key),
            escape_expression(value)
        );
    }
    push_location(&mut out, &event.location);
    out.push_str(">\n");
    out
}

/// Line recorded for a generated-output event owned by a node at `depth`
fn output_text(output: &OutputEvent, depth: usize) -> String {
    let mut out = String::new();
    indent(&mut out, depth);
    let _ = write!(out, "<output event=\"{}\"", output.kind);
    if let Some(name) = &output.name {
        let _ = write!(out, " name=\"{}\"", escape_attribute(name));
    }
    if let Some(text) = &output.text {
        let _ = write!(out, " text=\"{}\"", escape_attribute(text));
    }
    out.push_str("/>\n");
    out
}
