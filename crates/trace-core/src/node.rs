//! Reconstructed trace tree

use std::fmt;

use crate::event::{DetailLevel, Location, Tag};

/// Identifier of a node, unique within one trace context.
///
/// Ids are handed out by a per-context counter; the root sentinel is `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Id of the root sentinel
    pub const ROOT: NodeId = NodeId(0);

    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One reconstructed invocation or instruction execution.
///
/// A node owns its children. Nodes are only mutated by the builder while
/// they are open; once handed out through a [`TraceTree`] they are frozen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceNode {
    pub(crate) id: NodeId,
    pub(crate) tag: Tag,
    pub(crate) name: Option<String>,
    pub(crate) match_expression: Option<String>,
    pub(crate) location: Location,
    pub(crate) built_in: bool,
    pub(crate) selected_node: Option<String>,
    pub(crate) raw_text: String,
    pub(crate) depth: usize,
    pub(crate) children: Vec<TraceNode>,
}

impl TraceNode {
    pub(crate) fn root() -> Self {
        Self {
            id: NodeId::ROOT,
            tag: Tag::Misc,
            name: Some("trace".to_string()),
            match_expression: None,
            location: Location::unknown(),
            built_in: false,
            selected_node: None,
            raw_text: String::new(),
            depth: 0,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Engine-reported name, if the adapter supplied one
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Element name as it appears in rendered text
    pub fn element_name(&self) -> &str {
        self.tag.element_name(self.name.as_deref())
    }

    /// Match pattern or template name; `None` for non-template nodes
    pub fn match_expression(&self) -> Option<&str> {
        self.match_expression.as_deref()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// True when the node comes from an implicit default rule
    pub fn is_built_in(&self) -> bool {
        self.built_in
    }

    pub fn selected_node(&self) -> Option<&str> {
        self.selected_node.as_deref()
    }

    /// Escaped opening tag plus directly-owned content
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Nesting depth; top-level invocations are at depth 1
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn children(&self) -> &[TraceNode] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_template(&self) -> bool {
        self.tag.is_template()
    }

    /// This node and all its descendants in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    stack: Vec<&'a TraceNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a TraceNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// The frozen result of one trace context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceTree {
    pub(crate) root: TraceNode,
    pub(crate) truncated: bool,
    pub(crate) detail_level: DetailLevel,
    pub(crate) engine_attributes: Vec<(String, String)>,
}

impl TraceTree {
    /// The synthetic root sentinel
    pub fn root(&self) -> &TraceNode {
        &self.root
    }

    /// Top-level invocations, in the order they were entered
    pub fn top_level(&self) -> &[TraceNode] {
        &self.root.children
    }

    /// True when frames were still open at close or a leave had no match
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn detail_level(&self) -> DetailLevel {
        self.detail_level
    }

    /// Attributes the engine reported when the transformation opened
    pub fn engine_attributes(&self) -> &[(String, String)] {
        &self.engine_attributes
    }

    /// Number of reconstructed nodes, excluding the root
    pub fn node_count(&self) -> usize {
        self.root.descendants().count() - 1
    }

    /// All reconstructed nodes in document order, excluding the root
    pub fn nodes(&self) -> impl Iterator<Item = &TraceNode> {
        self.root.descendants().skip(1)
    }
}
