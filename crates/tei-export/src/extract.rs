/*
 * extract.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Field extraction from the raw document tree.
//!
//! A document is a `doc` node whose children are named parts (`title`,
//! `contributors_part`, `tags_part`, `richtext_part`, ...). Every extractor
//! here returns a documented default when its part is missing, except
//! [`extract_body`]: a document without a body part cannot be exported.
//!
//! All tree walks are recursive and strictly pre-order, so the sequences
//! they return list items as encountered reading the document top to
//! bottom. Footnote and citation numbering downstream depend on that.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tei_model::{CitationInfo, DocumentNode, NodeKind, text_content};

use crate::error::{ExportError, Result};

pub use tei_model::text_nodes as extract_text_nodes;

/// Tag sections exported as keyword classes, in header order.
pub const TAG_SECTIONS: [&str; 3] = ["keywords", "topics", "contributionTypes"];

/// Tag section holding one ORCID per author.
pub const ORCID_SECTION: &str = "orcidIds";

static ORCID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{4}-[0-9]{4}-[0-9]{3}[0-9X]$").expect("valid"));

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Author {
    pub firstname: String,
    pub lastname: String,
    pub institution: String,
    pub email: String,
}

/// A citation node together with the metadata handed to the citation processor.
#[derive(Debug, Clone)]
pub struct ExtractedCitation<'a> {
    pub node: &'a DocumentNode,
    pub info: CitationInfo,
}

/// Everything the renderer and templates need, pulled out once per export.
#[derive(Debug, Clone)]
pub struct ExtractedFields<'a> {
    pub title: String,
    pub subtitle: String,
    pub authors: Vec<Author>,
    /// Aligned with `authors`; invalid or missing entries are empty.
    pub orcid_ids: Vec<String>,
    pub tags: BTreeMap<String, Vec<String>>,
    pub abstract_part: Option<&'a DocumentNode>,
    pub body: &'a DocumentNode,
    pub footnotes: Vec<&'a [DocumentNode]>,
    pub citations: Vec<ExtractedCitation<'a>>,
    pub image_ids: Vec<String>,
}

impl<'a> ExtractedFields<'a> {
    pub fn from_document(doc: &'a DocumentNode) -> Result<Self> {
        let body = extract_body(doc)?;
        let abstract_part = extract_abstract(doc);
        let authors = extract_authors(doc);
        let orcid_ids = extract_orcid_ids(doc, authors.len());
        let tags = TAG_SECTIONS
            .iter()
            .map(|id| (id.to_string(), extract_tags(doc, id)))
            .collect();

        let mut citations = Vec::new();
        let mut image_ids = Vec::new();
        for part in rich_text_parts(doc) {
            collect_citations(part, &mut citations);
            image_ids.extend(extract_image_ids(part.children()));
        }

        let fields = Self {
            title: extract_title(doc),
            subtitle: extract_subtitle(doc),
            authors,
            orcid_ids,
            tags,
            abstract_part,
            body,
            footnotes: extract_footnotes(body.children()),
            citations,
            image_ids,
        };
        tracing::debug!(
            authors = fields.authors.len(),
            footnotes = fields.footnotes.len(),
            citations = fields.citations.len(),
            images = fields.image_ids.len(),
            has_abstract = fields.abstract_part.is_some(),
            "extracted document fields"
        );
        Ok(fields)
    }

    /// Values of a tag section, empty when the section is missing.
    pub fn tag_section(&self, id: &str) -> &[String] {
        self.tags.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keywords(&self) -> &[String] {
        self.tag_section("keywords")
    }
}

/// The abstract and body parts, in document order.
fn rich_text_parts(doc: &DocumentNode) -> impl Iterator<Item = &DocumentNode> {
    doc.children().iter().filter(|part| {
        part.kind() == NodeKind::RichtextPart
            && matches!(part.attr_str("id"), Some("abstract" | "body"))
    })
}

/// First top-level part of the given kind, optionally with a matching `attrs.id`.
pub fn find_part<'a>(
    doc: &'a DocumentNode,
    kind: NodeKind,
    id: Option<&str>,
) -> Option<&'a DocumentNode> {
    doc.children()
        .iter()
        .find(|part| part.kind() == kind && id.is_none_or(|id| part.attr_str("id") == Some(id)))
}

/// Document title, `""` when there is no title part.
pub fn extract_title(doc: &DocumentNode) -> String {
    find_part(doc, NodeKind::Title, None)
        .map(text_content)
        .unwrap_or_default()
}

/// Text of the first `heading1` in the `subtitle` heading part, `""` when absent.
pub fn extract_subtitle(doc: &DocumentNode) -> String {
    find_part(doc, NodeKind::HeadingPart, Some("subtitle"))
        .and_then(|part| part.child_of_kind(NodeKind::Heading(1)))
        .map(|heading| {
            heading
                .children()
                .iter()
                .filter(|c| c.kind() == NodeKind::Text)
                .filter_map(|c| c.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Contributors in document order, `[]` when there is no contributors part.
pub fn extract_authors(doc: &DocumentNode) -> Vec<Author> {
    let Some(part) = find_part(doc, NodeKind::ContributorsPart, None) else {
        return Vec::new();
    };
    part.children()
        .iter()
        .filter(|c| c.kind() == NodeKind::Contributor)
        .map(|c| {
            let field = |key: &str| c.attr_str(key).unwrap_or_default().to_string();
            Author {
                firstname: field("firstname"),
                lastname: field("lastname"),
                institution: field("institution"),
                email: field("email"),
            }
        })
        .collect()
}

/// Values of the tags part with the given id, `[]` when absent.
pub fn extract_tags(doc: &DocumentNode, section_id: &str) -> Vec<String> {
    let Some(part) = find_part(doc, NodeKind::TagsPart, Some(section_id)) else {
        return Vec::new();
    };
    part.children()
        .iter()
        .filter(|c| c.kind() == NodeKind::Tag)
        .filter_map(|c| c.attr_str("tag"))
        .map(str::to_string)
        .collect()
}

/// An ORCID if `value` matches `NNNN-NNNN-NNNN-NNN[N|X]`, otherwise `""`.
pub fn validate_orcid(value: &str) -> String {
    let value = value.trim();
    if ORCID.is_match(value) {
        value.to_string()
    } else {
        String::new()
    }
}

/// ORCIDs aligned positionally with the authors.
///
/// The result always has exactly `author_count` entries.
pub fn extract_orcid_ids(doc: &DocumentNode, author_count: usize) -> Vec<String> {
    let mut ids: Vec<String> = extract_tags(doc, ORCID_SECTION)
        .iter()
        .map(|v| validate_orcid(v))
        .collect();
    ids.resize(author_count, String::new());
    ids
}

/// The `body` rich-text part. Its absence is the one fatal extraction error.
pub fn extract_body(doc: &DocumentNode) -> Result<&DocumentNode> {
    find_part(doc, NodeKind::RichtextPart, Some("body"))
        .ok_or_else(|| ExportError::malformed("document has no body part"))
}

pub fn extract_abstract(doc: &DocumentNode) -> Option<&DocumentNode> {
    find_part(doc, NodeKind::RichtextPart, Some("abstract"))
}

/// Every citation below `node`, pre-order.
///
/// A footnote's body is visited before the footnote node's own content,
/// matching the position of its reference marker in the text.
pub fn extract_citations(node: &DocumentNode) -> Vec<ExtractedCitation<'_>> {
    let mut out = Vec::new();
    collect_citations(node, &mut out);
    out
}

fn collect_citations<'a>(node: &'a DocumentNode, out: &mut Vec<ExtractedCitation<'a>>) {
    match node.kind() {
        NodeKind::Citation => out.push(ExtractedCitation {
            node,
            info: CitationInfo::from_node(node),
        }),
        NodeKind::Footnote => {
            for child in node.footnote_body() {
                collect_citations(child, out);
            }
        }
        _ => {}
    }
    for child in node.children() {
        collect_citations(child, out);
    }
}

/// Footnote bodies in document order. Footnotes do not nest.
pub fn extract_footnotes(nodes: &[DocumentNode]) -> Vec<&[DocumentNode]> {
    let mut out = Vec::new();
    for node in nodes {
        collect_footnotes(node, &mut out);
    }
    out
}

fn collect_footnotes<'a>(node: &'a DocumentNode, out: &mut Vec<&'a [DocumentNode]>) {
    if node.kind() == NodeKind::Footnote {
        out.push(node.footnote_body());
        return;
    }
    for child in node.children() {
        collect_footnotes(child, out);
    }
}

/// Ids of the images placed in figures, in document order (duplicates kept).
///
/// Figures inside footnote bodies count too, since footnotes are rendered.
pub fn extract_image_ids(nodes: &[DocumentNode]) -> Vec<String> {
    let mut out = Vec::new();
    for node in nodes {
        collect_image_ids(node, &mut out);
    }
    out
}

fn collect_image_ids(node: &DocumentNode, out: &mut Vec<String>) {
    match node.kind() {
        NodeKind::Figure => out.extend(
            node.children()
                .iter()
                .filter(|c| c.kind() == NodeKind::Image)
                .filter_map(|c| c.attr_id("image")),
        ),
        NodeKind::Footnote => {
            for child in node.footnote_body() {
                collect_image_ids(child, out);
            }
        }
        _ => {
            for child in node.children() {
                collect_image_ids(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(s: &str) -> DocumentNode {
        DocumentNode::text(s)
    }

    fn para(content: Vec<DocumentNode>) -> DocumentNode {
        DocumentNode::new("paragraph").with_content(content)
    }

    fn footnote(body: &str) -> DocumentNode {
        DocumentNode::new("footnote").with_footnote(vec![para(vec![text(body)])])
    }

    fn citation(id: u64) -> DocumentNode {
        DocumentNode::new("citation")
            .with_attr("format", "autocite")
            .with_attr("references", json!([{"id": id}]))
    }

    fn figure(image: u64) -> DocumentNode {
        DocumentNode::new("figure").with_content(vec![
            DocumentNode::new("image").with_attr("image", image),
            DocumentNode::new("figure_caption"),
        ])
    }

    fn tags(id: &str, values: &[&str]) -> DocumentNode {
        DocumentNode::new("tags_part").with_attr("id", id).with_content(
            values
                .iter()
                .map(|v| DocumentNode::new("tag").with_attr("tag", *v))
                .collect(),
        )
    }

    fn body(content: Vec<DocumentNode>) -> DocumentNode {
        DocumentNode::new("richtext_part")
            .with_attr("id", "body")
            .with_content(content)
    }

    fn doc(parts: Vec<DocumentNode>) -> DocumentNode {
        DocumentNode::new("doc").with_content(parts)
    }

    fn ids(citations: &[ExtractedCitation<'_>]) -> Vec<String> {
        citations
            .iter()
            .flat_map(|c| c.info.reference_ids())
            .collect()
    }

    #[test]
    fn test_title_and_subtitle() {
        let d = doc(vec![
            DocumentNode::new("title").with_content(vec![text("Main "), text("title")]),
            DocumentNode::new("heading_part")
                .with_attr("id", "subtitle")
                .with_content(vec![
                    DocumentNode::new("heading1").with_content(vec![text("Sub"), text("title")]),
                ]),
            body(vec![]),
        ]);
        assert_eq!(extract_title(&d), "Main title");
        assert_eq!(extract_subtitle(&d), "Subtitle");
    }

    #[test]
    fn test_missing_optional_parts_default() {
        let d = doc(vec![body(vec![])]);
        let fields = ExtractedFields::from_document(&d).unwrap();
        assert_eq!(fields.title, "");
        assert_eq!(fields.subtitle, "");
        assert!(fields.authors.is_empty());
        assert!(fields.keywords().is_empty());
        assert!(fields.tag_section("topics").is_empty());
        assert!(fields.abstract_part.is_none());
    }

    #[test]
    fn test_missing_body_is_fatal() {
        let d = doc(vec![DocumentNode::new("title").with_content(vec![text("T")])]);
        let err = ExtractedFields::from_document(&d).unwrap_err();
        assert!(matches!(err, ExportError::MalformedDocument(_)));
    }

    #[test]
    fn test_authors_default_missing_fields() {
        let d = doc(vec![
            DocumentNode::new("contributors_part").with_content(vec![
                DocumentNode::new("contributor")
                    .with_attr("firstname", "Ada")
                    .with_attr("lastname", "Lovelace")
                    .with_attr("institution", "Analytical Engines"),
                DocumentNode::new("contributor").with_attr("lastname", "Babbage"),
            ]),
            body(vec![]),
        ]);
        let authors = extract_authors(&d);
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].firstname, "Ada");
        assert_eq!(authors[0].email, "");
        assert_eq!(authors[1].lastname, "Babbage");
        assert_eq!(authors[1].firstname, "");
    }

    #[test]
    fn test_tag_sections() {
        let d = doc(vec![
            tags("keywords", &["TEI", "XML"]),
            tags("topics", &["Editions"]),
            body(vec![]),
        ]);
        assert_eq!(extract_tags(&d, "keywords"), vec!["TEI", "XML"]);
        assert_eq!(extract_tags(&d, "topics"), vec!["Editions"]);
        assert!(extract_tags(&d, "contributionTypes").is_empty());
    }

    #[test]
    fn test_validate_orcid() {
        assert_eq!(validate_orcid("0000-0002-2771-9344"), "0000-0002-2771-9344");
        assert_eq!(validate_orcid("0000-0002-1694-233X"), "0000-0002-1694-233X");
        assert_eq!(validate_orcid("not an orcid"), "");
        assert_eq!(validate_orcid(""), "");
        assert_eq!(validate_orcid("0000-0002-2771-93X4"), "");
        assert_eq!(validate_orcid("0000-0002-2771-9344-1"), "");
    }

    #[test]
    fn test_orcids_align_with_authors() {
        let d = doc(vec![
            tags(ORCID_SECTION, &["bogus", "0000-0002-2771-9344"]),
            body(vec![]),
        ]);
        assert_eq!(
            extract_orcid_ids(&d, 3),
            vec!["", "0000-0002-2771-9344", ""]
        );
        assert_eq!(extract_orcid_ids(&d, 1), vec![""]);
    }

    #[test]
    fn test_citations_in_document_order() {
        let b = body(vec![
            para(vec![citation(1), text("x"), citation(2)]),
            para(vec![
                DocumentNode::new("footnote")
                    .with_footnote(vec![para(vec![citation(3), citation(4)])]),
                citation(5),
            ]),
            DocumentNode::new("blockquote").with_content(vec![para(vec![citation(6)])]),
        ]);
        assert_eq!(ids(&extract_citations(&b)), vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn test_citations_keep_node_identity() {
        let b = body(vec![para(vec![citation(1)])]);
        let citations = extract_citations(&b);
        assert!(std::ptr::eq(citations[0].node, &b.children()[0].children()[0]));
    }

    #[test]
    fn test_fields_collect_abstract_citations_first() {
        let d = doc(vec![
            DocumentNode::new("richtext_part")
                .with_attr("id", "abstract")
                .with_content(vec![para(vec![citation(9)])]),
            body(vec![para(vec![citation(1)])]),
        ]);
        let fields = ExtractedFields::from_document(&d).unwrap();
        assert_eq!(ids(&fields.citations), vec!["9", "1"]);
    }

    #[test]
    fn test_footnotes_in_document_order() {
        let nodes = vec![
            para(vec![text("a"), footnote("first")]),
            DocumentNode::new("bullet_list").with_content(vec![
                DocumentNode::new("list_item").with_content(vec![para(vec![footnote("second")])]),
            ]),
            para(vec![footnote("third"), footnote("fourth")]),
        ];
        let bodies: Vec<String> = extract_footnotes(&nodes)
            .into_iter()
            .map(|b| text_content(&b[0]))
            .collect();
        assert_eq!(bodies, vec!["first", "second", "third", "fourth"]);
    }

    #[test]
    fn test_image_ids_in_document_order_with_duplicates() {
        let nodes = vec![
            figure(7),
            para(vec![DocumentNode::new("footnote").with_footnote(vec![figure(8)])]),
            DocumentNode::new("blockquote").with_content(vec![figure(9), figure(7)]),
        ];
        assert_eq!(extract_image_ids(&nodes), vec!["7", "8", "9", "7"]);
    }

    #[test]
    fn test_text_nodes() {
        let p = para(vec![text("a"), DocumentNode::new("citation"), text("b")]);
        assert_eq!(extract_text_nodes(&p).len(), 2);
    }
}
