//! Report correlator
//!
//! Replays a frozen tree into the checkpoint protocol. Template nodes with
//! children become start/end sections; everything else becomes an info
//! entry. Emission is strictly sequential, in document order.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::Result;
use crate::node::{TraceNode, TraceTree};
use crate::recorder::CheckpointRecorder;
use crate::render::{render, render_node_only};
use crate::stylesheet::{StylesheetIndex, TemplateExcerpt};

/// What to do with nodes produced by implicit default rules
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::AsRefStr,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BuiltInRulePolicy {
    /// Drop built-in nodes together with their subtree
    #[default]
    Skip,
    /// Emit them like authored rules, with a built-in label
    Emit,
}

/// Counts of what a walk emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CorrelationSummary {
    pub startpoints: usize,
    pub infopoints: usize,
    pub endpoints: usize,
    pub skipped_built_in: usize,
}

/// Section label of a template node.
pub fn template_label(node: &TraceNode) -> String {
    let pattern = node.match_expression().unwrap_or_default();
    if node.is_built_in() {
        format!(
            "built-in-rule match={} node={}",
            pattern,
            node.selected_node().unwrap_or_default()
        )
    } else {
        format!("template match={}", pattern)
    }
}

/// Label of a template excerpt entry
pub fn excerpt_label(line: usize, column: usize, stylesheet: &str) -> String {
    format!("Line #{} Column #{}: {}", line, column, stylesheet)
}

/// Walks trees into a recorder.
///
/// Holds configuration only, so one correlator can serve any number of
/// trees, concurrently or not.
#[derive(Debug, Clone)]
pub struct ReportCorrelator<'a> {
    correlation_id: &'a str,
    policy: BuiltInRulePolicy,
    stylesheets: Option<&'a StylesheetIndex>,
}

impl<'a> ReportCorrelator<'a> {
    pub fn new(correlation_id: &'a str) -> Self {
        Self {
            correlation_id,
            policy: BuiltInRulePolicy::default(),
            stylesheets: None,
        }
    }

    pub fn with_policy(mut self, policy: BuiltInRulePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Follow every authored template section with its source excerpts
    pub fn with_stylesheets(mut self, stylesheets: &'a StylesheetIndex) -> Self {
        self.stylesheets = Some(stylesheets);
        self
    }

    pub fn correlation_id(&self) -> &str {
        self.correlation_id
    }

    pub fn policy(&self) -> BuiltInRulePolicy {
        self.policy
    }

    /// Emit the checkpoint calls for `tree`.
    ///
    /// The first recorder failure aborts the walk and is returned as is;
    /// whatever was emitted before it stays emitted.
    pub fn correlate<R>(&self, tree: &TraceTree, recorder: &mut R) -> Result<CorrelationSummary>
    where
        R: CheckpointRecorder + ?Sized,
    {
        let mut summary = CorrelationSummary::default();
        for node in tree.top_level() {
            self.walk(node, recorder, &mut summary)?;
        }
        debug!(
            correlation_id = self.correlation_id,
            startpoints = summary.startpoints,
            infopoints = summary.infopoints,
            endpoints = summary.endpoints,
            skipped_built_in = summary.skipped_built_in,
            "correlation finished"
        );
        Ok(summary)
    }

    fn walk<R>(
        &self,
        node: &TraceNode,
        recorder: &mut R,
        summary: &mut CorrelationSummary,
    ) -> Result<()>
    where
        R: CheckpointRecorder + ?Sized,
    {
        if node.is_built_in() && self.policy == BuiltInRulePolicy::Skip {
            trace!(id = %node.id(), "skipping built-in rule");
            summary.skipped_built_in += 1;
            return Ok(());
        }

        let id = node.id().to_string();
        if !node.is_template() {
            let content = render_node_only(node);
            recorder.infopoint(
                self.correlation_id,
                Some(&id),
                node.element_name(),
                Some(&content),
            )?;
            summary.infopoints += 1;
            return self.walk_children(node, recorder, summary);
        }

        let label = template_label(node);
        let content = render(node, false);
        if node.is_leaf() {
            recorder.infopoint(self.correlation_id, Some(&id), &label, Some(&content))?;
            summary.infopoints += 1;
            return Ok(());
        }

        recorder.startpoint(self.correlation_id, Some(&id), &label, Some(&content))?;
        summary.startpoints += 1;
        self.emit_excerpts(node, recorder, summary)?;
        self.walk_children(node, recorder, summary)?;
        recorder.endpoint(self.correlation_id, Some(&id), &label, Some(&content))?;
        summary.endpoints += 1;
        Ok(())
    }

    fn walk_children<R>(
        &self,
        node: &TraceNode,
        recorder: &mut R,
        summary: &mut CorrelationSummary,
    ) -> Result<()>
    where
        R: CheckpointRecorder + ?Sized,
    {
        for child in node.children() {
            self.walk(child, recorder, summary)?;
        }
        Ok(())
    }

    fn emit_excerpts<R>(
        &self,
        node: &TraceNode,
        recorder: &mut R,
        summary: &mut CorrelationSummary,
    ) -> Result<()>
    where
        R: CheckpointRecorder + ?Sized,
    {
        let (Some(index), Some(pattern)) = (self.stylesheets, node.match_expression()) else {
            return Ok(());
        };
        if node.is_built_in() {
            return Ok(());
        }
        // One entry per stylesheet, labelled after its first match
        let mut sheets: Vec<(&str, &TemplateExcerpt, Vec<&str>)> = Vec::new();
        for (stylesheet, excerpt) in index.templates_matching(pattern) {
            match sheets.last_mut() {
                Some((name, _, texts)) if *name == stylesheet => texts.push(&excerpt.text),
                _ => sheets.push((stylesheet, excerpt, vec![excerpt.text.as_str()])),
            }
        }
        for (stylesheet, first, texts) in sheets {
            let label = excerpt_label(first.line, first.column, stylesheet);
            let content = texts.join("\n");
            recorder.infopoint(self.correlation_id, Some(stylesheet), &label, Some(&content))?;
            summary.infopoints += 1;
        }
        Ok(())
    }
}
