/*
 * citations/structured.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Structured `<bibl>` entries built from bibliography database fields
//! instead of a CSL-formatted string.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tei_model::{BibDb, BibEntry, BibName, CitationInfo, DocumentNode, NodeKind};
use tei_xml::{escape_attribute, escape_xml_text, wrap};

use crate::render::render_text;

static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}(-[0-9]{2}(-[0-9]{2})?)?$").expect("date pattern is valid")
});

fn rich_text(nodes: &[DocumentNode]) -> String {
    nodes
        .iter()
        .filter(|n| n.kind() == NodeKind::Text)
        .map(render_text)
        .collect()
}

/// `<name><surname>..</surname><forename>..</forename></name>`, or the
/// literal name for organizations.
pub fn bib_name(name: &BibName) -> String {
    if let Some(literal) = &name.literal {
        return wrap("name", &rich_text(literal), &[]);
    }
    let surname = wrap("surname", &rich_text(&name.family), &[]);
    let forename = wrap("forename", &rich_text(&name.given), &[]);
    wrap("name", &format!("{surname}{forename}"), &[])
}

fn optional(name: &str, content: String, attrs: &[(&str, &str)]) -> String {
    if content.is_empty() {
        String::new()
    } else {
        wrap(name, &content, attrs)
    }
}

/// One `<bibl>` with a child element per known field, or `""` when the
/// entry has none of them.
pub fn bibl_item(entry: &BibEntry) -> String {
    let f = &entry.fields;
    let people = |names: &Option<Vec<BibName>>, role: &str| -> String {
        names
            .iter()
            .flatten()
            .map(|n| wrap(role, &bib_name(n), &[]))
            .collect()
    };
    let joined = |parts: &Option<Vec<Vec<DocumentNode>>>| -> String {
        parts.iter().flatten().map(|p| rich_text(p)).collect()
    };

    let authors = people(&f.author, "author");
    let title = optional("title", rich_text(f.title.as_deref().unwrap_or(&[])), &[]);
    let date = match f.date.as_deref() {
        Some(d) if ISO_DATE.is_match(d) => {
            wrap("date", &escape_xml_text(d), &[("when", escape_attribute(d).as_str())])
        }
        Some(d) => optional("date", escape_xml_text(d), &[]),
        None => String::new(),
    };
    let doi = optional(
        "idno",
        escape_xml_text(f.doi.as_deref().unwrap_or_default()),
        &[("type", "DOI")],
    );
    let url = match f.url.as_deref() {
        Some(u) if !u.is_empty() => wrap(
            "ref",
            &escape_xml_text(u),
            &[("target", escape_attribute(u).as_str())],
        ),
        _ => String::new(),
    };
    let isbn = optional(
        "idno",
        rich_text(f.isbn.as_deref().unwrap_or(&[])),
        &[("type", "ISBN")],
    );
    let issn = optional(
        "idno",
        rich_text(f.issn.as_deref().unwrap_or(&[])),
        &[("type", "ISSN")],
    );
    let journal = optional(
        "title",
        rich_text(f.journaltitle.as_deref().unwrap_or(&[])),
        &[("level", "j")],
    );
    let issue = optional(
        "biblScope",
        rich_text(f.issue.as_deref().unwrap_or(&[])),
        &[("unit", "issue")],
    );
    let edition = optional("edition", rich_text(f.edition.as_deref().unwrap_or(&[])), &[]);
    let editors = people(&f.editor, "editor") + &people(&f.editora, "editor");
    let publisher = optional("publisher", joined(&f.publisher), &[]);
    let place = optional("pubPlace", joined(&f.location), &[]);

    let content = [
        authors, title, date, doi, url, isbn, issn, journal, issue, edition, editors, publisher,
        place,
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("\n");
    optional("bibl", content, &[])
}

/// Entries referenced by the citations, in order of first citation.
pub fn structured_bibl_items(db: &BibDb, citations: &[CitationInfo]) -> String {
    let mut seen = HashSet::new();
    citations
        .iter()
        .flat_map(CitationInfo::reference_ids)
        .filter(|id| seen.insert(id.clone()))
        .filter_map(|id| {
            let entry = db.get(&id);
            if entry.is_none() {
                tracing::warn!(id = %id, "cited entry missing from bibliography database");
            }
            entry
        })
        .map(bibl_item)
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
