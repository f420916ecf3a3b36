//! Trace renderer
//!
//! Pure functions over frozen nodes. Rendering never mutates a node and never
//! depends on a recorder being reachable, so it is always safe to call on a
//! partial tree.

use crate::escape::escape_attribute;
use crate::node::{TraceNode, TraceTree};

/// Banner placed before each independent top-level trace
pub const SEPARATOR: &str = "--------------------------------------------New template being applied--------------------------------------------\n";

/// Marker appended to a complete rendering when the tree is truncated
pub const TRUNCATED_MARKER: &str = "<!-- trace truncated -->\n";

/// Render `node` and all its descendants.
pub fn render(node: &TraceNode, include_separator: bool) -> String {
    let mut out = String::new();
    if include_separator {
        out.push_str(SEPARATOR);
    }
    write_subtree(&mut out, node);
    out
}

/// Render only what `node` owns directly, without its children.
pub fn render_node_only(node: &TraceNode) -> String {
    let mut out = String::new();
    write_own(&mut out, node);
    out
}

/// Render every top-level invocation of a tree in order.
///
/// Each invocation is followed by a newline; a truncated tree ends with
/// [`TRUNCATED_MARKER`].
pub fn render_tree(tree: &TraceTree, show_separator: bool) -> String {
    let mut out = String::new();
    out.push_str(tree.root().raw_text());
    for node in tree.top_level() {
        out.push_str(&render(node, show_separator));
        out.push('\n');
    }
    if tree.is_truncated() {
        out.push_str(TRUNCATED_MARKER);
    }
    out
}

/// Render a flat, ordered list of nodes, one after another.
pub fn render_sequence<'a, I>(nodes: I, include_separator: bool) -> String
where
    I: IntoIterator<Item = &'a TraceNode>,
{
    nodes
        .into_iter()
        .map(|node| render(node, include_separator))
        .collect()
}

fn write_subtree(out: &mut String, node: &TraceNode) {
    write_own(out, node);
    for child in node.children() {
        write_subtree(out, child);
    }
}

fn write_own(out: &mut String, node: &TraceNode) {
    out.push_str(node.raw_text());
    if let Some(selected) = node.selected_node() {
        for _ in 0..node.depth() {
            out.push_str("  ");
        }
        out.push_str("<selected node=\"");
        out.push_str(&escape_attribute(selected));
        out.push_str("\"/>\n");
    }
}
