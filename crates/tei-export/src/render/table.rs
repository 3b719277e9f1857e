/*
 * render/table.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Tables and lists. Their sub-nodes are only meaningful here; reached on
//! their own they render to nothing.

use tei_model::{DocumentNode, NodeKind};
use tei_xml::wrap;

use super::{RenderContext, RenderState, render_children};
use crate::error::RenderError;

pub(super) fn render_table(
    node: &DocumentNode,
    ctx: &RenderContext<'_, '_>,
    state: &mut RenderState,
) -> Result<String, RenderError> {
    let mut out = String::new();
    if node.attr_flag("caption")
        && let Some(caption) = node.child_of_kind(NodeKind::TableCaption)
    {
        out.push_str(&wrap("head", &render_children(caption, ctx, state)?, &[]));
    }
    if let Some(body) = node.child_of_kind(NodeKind::TableBody) {
        for row in body
            .children()
            .iter()
            .filter(|r| r.kind() == NodeKind::TableRow)
        {
            out.push_str(&render_row(row, ctx, state)?);
        }
    }
    Ok(wrap("table", &out, &[]))
}

fn render_row(
    row: &DocumentNode,
    ctx: &RenderContext<'_, '_>,
    state: &mut RenderState,
) -> Result<String, RenderError> {
    let mut cells = String::new();
    for cell in row.children() {
        cells.push_str(&render_cell(cell, ctx, state)?);
    }
    let is_label = row
        .children()
        .iter()
        .all(|c| c.kind() == NodeKind::TableHeader);
    let attrs: &[(&str, &str)] = if is_label { &[("role", "label")] } else { &[] };
    Ok(wrap("row", &cells, attrs))
}

fn render_cell(
    cell: &DocumentNode,
    ctx: &RenderContext<'_, '_>,
    state: &mut RenderState,
) -> Result<String, RenderError> {
    let header = match cell.kind() {
        NodeKind::TableHeader => true,
        NodeKind::TableCell => false,
        _ => return Ok(String::new()),
    };
    let cols = span(cell, "colspan");
    let rows = span(cell, "rowspan");

    let mut attrs: Vec<(&str, &str)> = Vec::new();
    if header {
        attrs.push(("role", "label"));
    }
    if let Some(cols) = &cols {
        attrs.push(("cols", cols.as_str()));
    }
    if let Some(rows) = &rows {
        attrs.push(("rows", rows.as_str()));
    }
    Ok(wrap("cell", &render_children(cell, ctx, state)?, &attrs))
}

fn span(cell: &DocumentNode, key: &str) -> Option<String> {
    cell.attr_u64(key).filter(|&n| n > 1).map(|n| n.to_string())
}

pub(super) fn render_list(
    node: &DocumentNode,
    rend: &str,
    ctx: &RenderContext<'_, '_>,
    state: &mut RenderState,
) -> Result<String, RenderError> {
    let mut items = String::new();
    for item in node
        .children()
        .iter()
        .filter(|c| c.kind() == NodeKind::ListItem)
    {
        items.push_str(&wrap("item", &render_children(item, ctx, state)?, &[]));
    }
    Ok(wrap("list", &items, &[("rend", rend)]))
}
