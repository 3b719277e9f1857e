/*
 * text.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::node::{DocumentNode, NodeKind};

/// All `text` nodes below (and including) `node`, in document order.
///
/// Footnote bodies are not visited.
pub fn text_nodes(node: &DocumentNode) -> Vec<&DocumentNode> {
    let mut out = Vec::new();
    collect_text_nodes(node, &mut out);
    out
}

fn collect_text_nodes<'a>(node: &'a DocumentNode, out: &mut Vec<&'a DocumentNode>) {
    if node.kind() == NodeKind::Text {
        out.push(node);
    }
    for child in node.children() {
        collect_text_nodes(child, out);
    }
}

/// Plain text of a subtree.
///
/// Inline content of a text block is concatenated as is; sibling blocks are
/// separated by a single space so words at block boundaries stay apart.
pub fn text_content(node: &DocumentNode) -> String {
    if node.kind() == NodeKind::Text {
        return node.text.clone().unwrap_or_default();
    }
    let separator = if node.kind().is_textblock() { "" } else { " " };
    node.children()
        .iter()
        .map(text_content)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}
