//! Per-invocation trace state
//!
//! A [`TraceContext`] belongs to exactly one transformation. It is never
//! shared, pooled or reused; concurrent transformations each get their own.

use crate::event::DetailLevel;
use crate::node::{NodeId, TraceNode, TraceTree};

/// One entry on the nesting stack.
///
/// Filtered enters still push a frame so that their leave pops the right
/// thing; the decision is remembered here instead of being recomputed.
#[derive(Debug)]
enum Frame {
    Open(TraceNode),
    Filtered,
}

/// What a pop removed from the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Popped {
    Node(NodeId),
    Filtered,
    Unmatched,
}

/// Mutable nesting stack and tree root of one transformation.
#[derive(Debug)]
pub struct TraceContext {
    root: TraceNode,
    frames: Vec<Frame>,
    detail_level: DetailLevel,
    next_id: u64,
    truncated: bool,
    engine_attributes: Vec<(String, String)>,
}

impl TraceContext {
    pub fn new(detail_level: DetailLevel) -> Self {
        Self {
            root: TraceNode::root(),
            frames: Vec::new(),
            detail_level,
            next_id: 1,
            truncated: false,
            engine_attributes: Vec::new(),
        }
    }

    pub fn detail_level(&self) -> DetailLevel {
        self.detail_level
    }

    /// Number of open frames, filtered ones included
    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    /// Ids from the root to the currently open node, bottom to top
    pub fn open_path(&self) -> Vec<NodeId> {
        std::iter::once(NodeId::ROOT)
            .chain(self.frames.iter().filter_map(|frame| match frame {
                Frame::Open(node) => Some(node.id),
                Frame::Filtered => None,
            }))
            .collect()
    }

    /// Depth a newly opened node would get
    pub(crate) fn next_depth(&self) -> usize {
        self.open_nodes().count() + 1
    }

    pub(crate) fn allocate_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn push_node(&mut self, node: TraceNode) {
        self.frames.push(Frame::Open(node));
    }

    pub(crate) fn push_filtered(&mut self) {
        self.frames.push(Frame::Filtered);
    }

    /// Pop the top frame, attaching a finished node to its parent
    pub(crate) fn pop(&mut self) -> Popped {
        match self.frames.pop() {
            Some(Frame::Open(node)) => {
                let id = node.id;
                self.current_mut().children.push(node);
                Popped::Node(id)
            }
            Some(Frame::Filtered) => Popped::Filtered,
            None => {
                self.truncated = true;
                Popped::Unmatched
            }
        }
    }

    /// Deepest open retained node, never the root
    pub(crate) fn top_mut(&mut self) -> Option<&mut TraceNode> {
        self.frames.iter_mut().rev().find_map(|frame| match frame {
            Frame::Open(node) => Some(node),
            Frame::Filtered => None,
        })
    }

    /// Deepest open retained node, falling back to the root
    pub(crate) fn current_mut(&mut self) -> &mut TraceNode {
        match self.frames.iter_mut().rev().find_map(|frame| match frame {
            Frame::Open(node) => Some(node),
            Frame::Filtered => None,
        }) {
            Some(node) => node,
            None => &mut self.root,
        }
    }

    pub(crate) fn add_engine_attributes(&mut self, attributes: &[(String, String)]) {
        self.engine_attributes.extend_from_slice(attributes);
    }

    /// Close every remaining frame in LIFO order and freeze the tree.
    ///
    /// Returns the tree and the number of frames that had to be forced.
    pub(crate) fn into_tree(mut self) -> (TraceTree, usize) {
        let forced = self.frames.len();
        while !self.frames.is_empty() {
            self.pop();
        }
        let tree = TraceTree {
            root: self.root,
            truncated: self.truncated || forced > 0,
            detail_level: self.detail_level,
            engine_attributes: self.engine_attributes,
        };
        (tree, forced)
    }

    fn open_nodes(&self) -> impl Iterator<Item = &TraceNode> {
        self.frames.iter().filter_map(|frame| match frame {
            Frame::Open(node) => Some(node),
            Frame::Filtered => None,
        })
    }
}
