/*
 * preprocess.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Copy-before-mutate preprocessing.
//!
//! The exporter never mutates its input tree. Destructive cleanups run here
//! and always return a fresh deep copy owned by the caller.

use crate::mark::MarkKind;
use crate::node::DocumentNode;

/// Deep copy of `node` without any descendant whose `attrs.hidden` is true.
///
/// Footnote bodies are filtered the same way. The root itself is always kept.
pub fn remove_hidden(node: &DocumentNode) -> DocumentNode {
    let mut copy = node.clone();
    drop_hidden_in_place(&mut copy);
    copy
}

fn drop_hidden_in_place(node: &mut DocumentNode) {
    if let Some(content) = node.content.as_mut() {
        content.retain(|c| !c.attr_flag("hidden"));
        content.iter_mut().for_each(drop_hidden_in_place);
    }
    if let Some(body) = node.attrs.as_mut().and_then(|a| a.footnote.as_mut()) {
        body.retain(|c| !c.attr_flag("hidden"));
        body.iter_mut().for_each(drop_hidden_in_place);
    }
}

/// Deep copy of `node` with all editorial comment marks removed.
pub fn strip_comment_marks(node: &DocumentNode) -> DocumentNode {
    let mut copy = node.clone();
    strip_comments_in_place(&mut copy);
    copy
}

fn strip_comments_in_place(node: &mut DocumentNode) {
    node.marks.retain(|m| m.kind() != MarkKind::Comment);
    if let Some(content) = node.content.as_mut() {
        content.iter_mut().for_each(strip_comments_in_place);
    }
    if let Some(body) = node.attrs.as_mut().and_then(|a| a.footnote.as_mut()) {
        body.iter_mut().for_each(strip_comments_in_place);
    }
}

/// Both cleanups in one copy: what an export runs before extraction.
pub fn prepare_for_export(doc: &DocumentNode) -> DocumentNode {
    let mut copy = doc.clone();
    drop_hidden_in_place(&mut copy);
    strip_comments_in_place(&mut copy);
    tracing::debug!(parts = copy.children().len(), "prepared document copy");
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mark::Mark;

    fn sample() -> DocumentNode {
        DocumentNode::new("doc").with_content(vec![
            DocumentNode::new("richtext_part")
                .with_attr("id", "abstract")
                .with_attr("hidden", true),
            DocumentNode::new("richtext_part")
                .with_attr("id", "body")
                .with_content(vec![DocumentNode::new("paragraph").with_content(vec![
                    DocumentNode::text("x").with_mark(Mark::new("comment")),
                    DocumentNode::new("footnote").with_footnote(vec![
                        DocumentNode::new("paragraph").with_attr("hidden", true),
                        DocumentNode::new("paragraph").with_content(vec![
                            DocumentNode::text("y")
                                .with_mark(Mark::new("comment"))
                                .with_mark(Mark::em()),
                        ]),
                    ]),
                ])]),
        ])
    }

    #[test]
    fn test_remove_hidden_drops_parts() {
        let doc = sample();
        let cleaned = remove_hidden(&doc);
        assert_eq!(cleaned.children().len(), 1);
        assert_eq!(cleaned.children()[0].attr_str("id"), Some("body"));
        // input untouched
        assert_eq!(doc.children().len(), 2);
    }

    #[test]
    fn test_remove_hidden_filters_footnote_bodies() {
        let cleaned = remove_hidden(&sample());
        let footnote = &cleaned.children()[0].children()[0].children()[1];
        assert_eq!(footnote.footnote_body().len(), 1);
    }

    #[test]
    fn test_strip_comment_marks() {
        let doc = sample();
        let cleaned = strip_comment_marks(&doc);
        let para = &cleaned.children()[1].children()[0];
        assert!(para.children()[0].marks.is_empty());
        let fn_text = &para.children()[1].footnote_body()[1].children()[0];
        assert_eq!(fn_text.marks, vec![Mark::em()]);
        // input untouched
        assert_eq!(doc.children()[1].children()[0].children()[0].marks.len(), 1);
    }

    #[test]
    fn test_prepare_for_export() {
        let cleaned = prepare_for_export(&sample());
        assert_eq!(cleaned.children().len(), 1);
        assert!(cleaned.children()[0].children()[0].children()[0].marks.is_empty());
    }
}
