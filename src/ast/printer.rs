//! Plain-text rendering of a tree, used for `--ast`/`--decorated`
//! dumps and for error reports.

use std::fmt::{Display, Write};

use super::ast::{NodeId, NodeKind, Tree};

const INDENT: &str = "  ";

/// Renders the tree reachable from the root.
pub fn render(tree: &Tree) -> String {
    match tree.root() {
        Some(root) => render_node(tree, root),
        None => String::new(),
    }
}

/// Renders the subtree rooted at `id`, one node per line.
pub fn render_node(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, 0, &mut out);
    out
}

fn write_node(tree: &Tree, id: NodeId, depth: usize, out: &mut String) {
    let _ = write!(out, "{:>4}: {}{}", id.0, INDENT.repeat(depth), tree.kind(id).name());

    match tree.kind(id) {
        NodeKind::Id(symbol) | NodeKind::Str(symbol) => {
            let _ = write!(out, " {}", symbol);
        }
        NodeKind::Int(value) => {
            let _ = write!(out, " {}", value);
        }
        NodeKind::Hex { text, .. } => {
            let _ = write!(out, " {}", text);
        }
        NodeKind::RelOp(op) | NodeKind::AddOp(op) | NodeKind::MultOp(op) => {
            let _ = write!(out, " {}", op);
        }
        _ => {}
    }

    if let Some(decoration) = tree.decoration(id) {
        let _ = write!(out, "  Dec: {}", decoration);
    }
    if let Some(label) = tree.label(id) {
        let _ = write!(out, "  Label: {}", label);
    }
    if let Some(offset) = tree.frame_offset(id) {
        let _ = write!(out, "  Addr: {}", offset);
    }
    out.push('\n');

    for kid in tree.kids(id) {
        write_node(tree, *kid, depth + 1, out);
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", render(self))
    }
}
