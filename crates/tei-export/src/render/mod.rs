/*
 * render/mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Rich text to TEI markup.
//!
//! [`render_node`] dispatches on the closed [`NodeKind`] set. Node types
//! without a rule render to the empty string, so one unsupported construct
//! never aborts an export. Counters and the open-section stack live in a
//! [`RenderState`] threaded through every call; the collaborators (image
//! lookup, citation texts, math) are read-only and live in the
//! [`RenderContext`].

mod inline;
mod state;
mod table;

use tei_model::{DocumentNode, NodeKind, text_nodes};
use tei_xml::{escape_attribute, escape_xml_text, tag, wrap};

use crate::citations::CitationTexts;
use crate::config::ExportConfig;
use crate::error::RenderError;
use crate::images::{ImageLookup, embedded_filename};
use crate::math::MathAdapter;

pub use inline::{render_text, render_text_with};
pub use state::RenderState;

/// Labels and attribute values the renderer writes into the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub figure_label: String,
    pub section_rend: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            figure_label: "Figure".to_string(),
            section_rend: "DH-Heading".to_string(),
        }
    }
}

impl From<&ExportConfig> for RenderOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            figure_label: config.figure_label.clone(),
            section_rend: config.section_rend.clone(),
        }
    }
}

/// Read-only collaborators for one render.
pub struct RenderContext<'a, 'ast> {
    pub images: &'a dyn ImageLookup,
    pub citations: &'a CitationTexts<'ast>,
    pub math: &'a MathAdapter,
    pub options: &'a RenderOptions,
}

/// Rendered rich text plus the footnotes collected while rendering it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedText {
    pub text: String,
    /// One `<note>` element per footnote, in numbering order.
    pub notes: Vec<String>,
}

impl RenderedText {
    /// `<div type="notes">` with every note, or `""` when there are none.
    pub fn notes_div(&self) -> String {
        if self.notes.is_empty() {
            return String::new();
        }
        wrap("div", &self.notes.join("\n"), &[("type", "notes")])
    }
}

/// Render a sequence of top-level blocks with fresh state, closing any
/// sections still open at the end.
pub fn render_rich_text(
    nodes: &[DocumentNode],
    ctx: &RenderContext<'_, '_>,
) -> Result<RenderedText, RenderError> {
    let mut state = RenderState::new();
    let mut text = String::new();
    for node in nodes {
        text.push_str(&render_node(node, ctx, &mut state)?);
    }
    text.push_str(&"</div>".repeat(state.close_all_sections()));
    tracing::debug!(
        footnotes = state.footnote_count,
        figures = state.figure_count,
        citations = state.citation_cursor,
        "rendered rich text"
    );
    Ok(RenderedText {
        text,
        notes: state.footnotes,
    })
}

pub fn render_node(
    node: &DocumentNode,
    ctx: &RenderContext<'_, '_>,
    state: &mut RenderState,
) -> Result<String, RenderError> {
    let kind = node.kind();
    match kind {
        NodeKind::Text => Ok(render_text(node)),
        NodeKind::Equation => match node.attr_str("equation") {
            Some(latex) => Ok(wrap("formula", &ctx.math.latex_to_mathml(latex)?, &[])),
            None => Ok(String::new()),
        },
        NodeKind::Footnote => render_footnote(node, ctx, state),
        NodeKind::Figure => render_figure(node, ctx, state),
        NodeKind::Table => table::render_table(node, ctx, state),
        NodeKind::OrderedList => table::render_list(node, "ordered", ctx, state),
        NodeKind::BulletList => table::render_list(node, "bulleted", ctx, state),
        NodeKind::Blockquote => Ok(wrap("quote", &render_children(node, ctx, state)?, &[])),
        NodeKind::CodeBlock => {
            let code: String = text_nodes(node)
                .iter()
                .filter_map(|t| t.text.as_deref())
                .collect();
            Ok(wrap("code", &escape_xml_text(&code), &[]))
        }
        NodeKind::Paragraph => {
            if node.content.is_none() {
                Ok(tag("lb", &[]))
            } else {
                Ok(wrap("p", &render_children(node, ctx, state)?, &[]))
            }
        }
        NodeKind::Heading(level) => {
            let closing = "</div>".repeat(state.enter_section(level));
            let head = wrap("head", &render_children(node, ctx, state)?, &[]);
            Ok(format!(
                "{closing}<div rend=\"{}\">{head}",
                escape_attribute(&ctx.options.section_rend)
            ))
        }
        NodeKind::Citation => {
            let index = state.citation_cursor;
            state.citation_cursor += 1;
            ctx.citations
                .text_for(node, index)
                .map(str::to_string)
                .ok_or(RenderError::MissingCitationText { index })
        }
        NodeKind::CrossReference => Ok(escape_xml_text(node.attr_str("title").unwrap_or_default())),
        NodeKind::Image
        | NodeKind::FigureCaption
        | NodeKind::TableBody
        | NodeKind::TableRow
        | NodeKind::TableHeader
        | NodeKind::TableCell
        | NodeKind::TableCaption
        | NodeKind::ListItem => Ok(String::new()),
        NodeKind::Contributor
        | NodeKind::ContributorsPart
        | NodeKind::Tag
        | NodeKind::TagsPart
        | NodeKind::Title
        | NodeKind::RichtextPart
        | NodeKind::HeadingPart
        | NodeKind::Unknown => {
            tracing::debug!(node_type = %node.node_type, "no rendering rule, skipping node");
            Ok(String::new())
        }
    }
}

/// Concatenated rendering of a node's children.
pub(crate) fn render_children(
    node: &DocumentNode,
    ctx: &RenderContext<'_, '_>,
    state: &mut RenderState,
) -> Result<String, RenderError> {
    render_all(node.children(), ctx, state)
}

fn render_all(
    nodes: &[DocumentNode],
    ctx: &RenderContext<'_, '_>,
    state: &mut RenderState,
) -> Result<String, RenderError> {
    let mut out = String::new();
    for node in nodes {
        out.push_str(&render_node(node, ctx, state)?);
    }
    Ok(out)
}

// The footnote number is taken before the body is rendered, so a footnote
// nested in another footnote's body gets the next number.
fn render_footnote(
    node: &DocumentNode,
    ctx: &RenderContext<'_, '_>,
    state: &mut RenderState,
) -> Result<String, RenderError> {
    let n = state.next_footnote().to_string();
    let id = format!("ftn{n}");
    let body = render_all(node.footnote_body(), ctx, state)?;
    state.footnotes.push(wrap(
        "note",
        &body,
        &[("n", n.as_str()), ("rend", "footnote text"), ("xml:id", id.as_str())],
    ));
    Ok(tag("ref", &[("n", n.as_str()), ("target", id.as_str())]))
}

fn render_figure(
    node: &DocumentNode,
    ctx: &RenderContext<'_, '_>,
    state: &mut RenderState,
) -> Result<String, RenderError> {
    let n = state.next_figure();
    let image_id = node
        .child_of_kind(NodeKind::Image)
        .and_then(|image| image.attr_id("image"));

    let graphic = match image_id.as_deref().and_then(|id| ctx.images.image_path(id)) {
        Some(path) => {
            let url = format!("images/{}", escape_attribute(embedded_filename(path)));
            tag("graphic", &[("url", url.as_str())])
        }
        None => {
            tracing::warn!(
                figure = n,
                image = image_id.as_deref().unwrap_or_default(),
                "figure image not found, omitting graphic"
            );
            String::new()
        }
    };

    let caption = match node.child_of_kind(NodeKind::FigureCaption) {
        Some(caption) if node.attr_flag("caption") => render_children(caption, ctx, state)?,
        _ => String::new(),
    };
    let label = escape_xml_text(&ctx.options.figure_label);
    let head = if caption.is_empty() {
        format!("{label} {n}")
    } else {
        format!("{label} {n}: {caption}")
    };
    Ok(wrap("figure", &format!("{graphic}{}", wrap("head", &head, &[])), &[]))
}
