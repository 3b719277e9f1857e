/*
 * render/inline.rs
 * Copyright (c) 2025 Posit, PBC
 */

use tei_model::{DocumentNode, Mark, MarkKind};
use tei_xml::{escape_attribute, escape_xml_text, link_ref, wrap};

/// Render a text node: escape, then apply its marks in order.
///
/// `em` and `strong` become `<hi>`, external links become `<ref>`. Links to
/// internal anchors (`#...`), comments and unknown marks leave the text as is.
pub fn render_text(node: &DocumentNode) -> String {
    render_text_with(node, |text| text)
}

/// Like [`render_text`], but `transform` rewrites the escaped text before any
/// mark is applied. Text inside an external link is not transformed, since
/// it already sits in a `<ref>`.
pub fn render_text_with(node: &DocumentNode, transform: impl FnOnce(String) -> String) -> String {
    let text = escape_xml_text(node.text.as_deref().unwrap_or_default());
    let text = if has_external_link(node) {
        text
    } else {
        transform(text)
    };
    node.marks
        .iter()
        .fold(text, |inner, mark| match mark.kind() {
            MarkKind::Em => wrap("hi", &inner, &[("rend", "italic")]),
            MarkKind::Strong => wrap("hi", &inner, &[("rend", "bold")]),
            MarkKind::Link => match external_href(mark) {
                Some(href) => link_ref(&escape_attribute(href), &inner),
                None => inner,
            },
            MarkKind::Comment | MarkKind::Other(_) => inner,
        })
}

fn external_href(mark: &Mark) -> Option<&str> {
    mark.href().filter(|href| !href.starts_with('#'))
}

fn has_external_link(node: &DocumentNode) -> bool {
    node.marks
        .iter()
        .any(|m| m.kind() == MarkKind::Link && external_href(m).is_some())
}
