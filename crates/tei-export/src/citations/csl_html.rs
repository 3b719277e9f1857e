/*
 * citations/csl_html.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Parse CSL processor bibliography markup back into document nodes.
//!
//! CSL engines emit each bibliography entry as a small HTML fragment:
//!
//! ```html
//! <div class="csl-entry">
//!   <div class="csl-left-margin">[1]</div>
//!   <div class="csl-right-inline">Doe, J. <i>Title</i>.</div>
//! </div>
//! ```
//!
//! Entries become `cslentry` nodes inside one `cslbib` node. Nested entry
//! divs become blocks (`cslleftmargin`, `cslrightinline`, `cslindent`,
//! `cslblock`) and inline formatting becomes marks on text nodes, so the
//! bibliography can be rendered with the same text rules as authored content.

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use tei_model::{DocumentNode, Mark};

use crate::error::CitationError;

enum Open {
    Block,
    Mark,
    Transparent,
}

pub fn parse_bibliography(entries: &[String]) -> Result<DocumentNode, CitationError> {
    let content = entries
        .iter()
        .map(|html| parse_entry(html))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DocumentNode::new("cslbib").with_content(content))
}

fn parse_entry(html: &str) -> Result<DocumentNode, CitationError> {
    let mut reader = Reader::from_str(html);
    reader.config_mut().check_end_names = false;

    let mut blocks = vec![DocumentNode::new("cslentry").with_content(Vec::new())];
    let mut marks: Vec<Mark> = Vec::new();
    let mut open: Vec<Open> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| CitationError::Bibliography(e.to_string()))?;
        match event {
            Event::Start(e) => {
                let name = element_name(&e);
                if is_void(&name) {
                    continue;
                }
                if let Some(block_type) = block_type(&e, &name, blocks.len(), open.is_empty()) {
                    blocks.push(DocumentNode::new(block_type).with_content(Vec::new()));
                    open.push(Open::Block);
                } else if let Some(mark) = inline_mark(&e, &name) {
                    marks.push(mark);
                    open.push(Open::Mark);
                } else {
                    open.push(Open::Transparent);
                }
            }
            Event::End(_) => match open.pop() {
                Some(Open::Block) => close_block(&mut blocks),
                Some(Open::Mark) => {
                    marks.pop();
                }
                Some(Open::Transparent) | None => {}
            },
            Event::Text(t) => {
                let text = t
                    .unescape_with(html_entity)
                    .map_err(|e| CitationError::Bibliography(e.to_string()))?;
                push_text(&mut blocks, &text, &marks);
            }
            Event::CData(c) => {
                let bytes = c.into_inner();
                push_text(&mut blocks, &String::from_utf8_lossy(&bytes), &marks);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    while blocks.len() > 1 {
        close_block(&mut blocks);
    }
    blocks
        .pop()
        .ok_or_else(|| CitationError::Bibliography("empty entry".to_string()))
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase()
}

fn is_void(name: &str) -> bool {
    matches!(name, "br" | "hr" | "img" | "wbr")
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Option<String> {
    let attr = e.try_get_attribute(key).ok()??;
    attr.unescape_value()
        .map(|v| v.into_owned())
        .ok()
        .or_else(|| Some(String::from_utf8_lossy(&attr.value).into_owned()))
}

/// Node type for a block element, or None for inline elements.
///
/// The outermost `csl-entry` div is the entry itself and opens no block.
fn block_type(
    e: &BytesStart<'_>,
    name: &str,
    depth: usize,
    at_top: bool,
) -> Option<&'static str> {
    if name != "div" && name != "p" {
        return None;
    }
    let class = attribute(e, "class").unwrap_or_default();
    let has = |c: &str| class.split_whitespace().any(|x| x == c);
    if has("csl-entry") && depth == 1 && at_top {
        return None;
    }
    Some(if has("csl-left-margin") {
        "cslleftmargin"
    } else if has("csl-right-inline") {
        "cslrightinline"
    } else if has("csl-indent") {
        "cslindent"
    } else {
        "cslblock"
    })
}

fn inline_mark(e: &BytesStart<'_>, name: &str) -> Option<Mark> {
    match name {
        "i" | "em" => Some(Mark::em()),
        "b" | "strong" => Some(Mark::strong()),
        "a" => attribute(e, "href").map(Mark::link),
        "sup" | "sub" => Some(Mark::new(name)),
        "span" => {
            let style = attribute(e, "style").unwrap_or_default();
            let class = attribute(e, "class").unwrap_or_default();
            if style.contains("small-caps") {
                Some(Mark::new("smallcaps"))
            } else if class.split_whitespace().any(|c| c == "nocase") {
                Some(Mark::new("nocase"))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn push_text(blocks: &mut [DocumentNode], text: &str, marks: &[Mark]) {
    if text.is_empty() {
        return;
    }
    let Some(current) = blocks.last_mut() else {
        return;
    };
    let mut node = DocumentNode::text(text);
    node.marks = marks.to_vec();
    current.content.get_or_insert_with(Vec::new).push(node);
}

fn close_block(blocks: &mut Vec<DocumentNode>) {
    if blocks.len() < 2 {
        return;
    }
    let Some(block) = blocks.pop() else {
        return;
    };
    if let Some(parent) = blocks.last_mut() {
        parent.content.get_or_insert_with(Vec::new).push(block);
    }
}

/// XML's predefined entities plus the HTML named entities CSL engines emit.
fn html_entity(name: &str) -> Option<&'static str> {
    if let Some(predefined) = resolve_predefined_entity(name) {
        return Some(predefined);
    }
    Some(match name {
        "nbsp" => "\u{a0}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "laquo" => "\u{ab}",
        "raquo" => "\u{bb}",
        "shy" => "\u{ad}",
        "copy" => "\u{a9}",
        _ => return None,
    })
}
