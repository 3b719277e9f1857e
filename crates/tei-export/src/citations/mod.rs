/*
 * citations/mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Citation and bibliography formatting.
//!
//! Formatting citations is delegated to a [`CitationProcessor`] (a CSL
//! engine or a precomputed result). The processor sees the citations in
//! document order and returns one display text per citation plus the
//! formatted bibliography entries.
//!
//! Display texts are bound to the citation *nodes* they were produced for
//! as soon as the processor returns, so the renderer looks them up by node
//! identity and never depends on walking the tree in the same order as the
//! extractor did.

mod csl_html;
mod headers;
mod precomputed;
mod structured;

use std::collections::HashMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use tei_model::{CitationInfo, DocumentNode, NodeKind};
use tei_xml::{linkify, wrap};

use crate::error::CitationError;
use crate::extract::ExtractedCitation;
use crate::render::render_text_with;

pub use csl_html::parse_bibliography;
pub use headers::bibliography_header;
pub use precomputed::PrecomputedCitations;
pub use structured::{bib_name, bibl_item, structured_bibl_items};

/// Style and locale handed to the citation processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationSettings {
    pub style: String,
    pub language: String,
    pub bibliography_header: String,
}

/// Output of one citation processor run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessedCitations {
    /// One display text per input citation, same order. These are inserted
    /// into the TEI text verbatim, so they must be well-formed markup.
    #[serde(default)]
    pub citation_texts: Vec<String>,
    /// Formatted bibliography entries in processor-native (HTML) markup.
    #[serde(default)]
    pub bibliography: Vec<String>,
}

#[async_trait]
pub trait CitationProcessor: Send + Sync {
    fn name(&self) -> &str;

    async fn process(
        &self,
        citations: &[CitationInfo],
        settings: &CitationSettings,
    ) -> Result<ProcessedCitations, CitationError>;
}

/// Address of a node in a borrowed tree, used as a lookup key.
///
/// The tree is borrowed immutably for as long as the key is in use, so the
/// address is stable; it is never dereferenced.
#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
pub struct NodePtr(*const ());

impl NodePtr {
    #[inline]
    pub fn from_ref(node: &DocumentNode) -> Self {
        NodePtr(node as *const DocumentNode as *const ())
    }
}

/// Citation display texts, keyed by citation node.
#[derive(Debug, Default)]
pub struct CitationTexts<'a> {
    texts: Vec<String>,
    by_node: HashMap<NodePtr, usize>,
    _marker: PhantomData<&'a DocumentNode>,
}

impl<'a> CitationTexts<'a> {
    /// Bind processor output to the citations it was computed for.
    pub fn new(
        citations: &[ExtractedCitation<'a>],
        texts: Vec<String>,
    ) -> Result<Self, CitationError> {
        if citations.len() != texts.len() {
            return Err(CitationError::Misaligned {
                expected: citations.len(),
                actual: texts.len(),
            });
        }
        let by_node = citations
            .iter()
            .enumerate()
            .map(|(i, c)| (NodePtr::from_ref(c.node), i))
            .collect();
        Ok(Self {
            texts,
            by_node,
            _marker: PhantomData,
        })
    }

    /// Texts without node bindings; lookups fall back to position.
    pub fn positional(texts: Vec<String>) -> Self {
        Self {
            texts,
            by_node: HashMap::new(),
            _marker: PhantomData,
        }
    }

    /// Text for a citation node, or for the `position`-th citation rendered
    /// when the node was not part of the processed set.
    pub fn text_for(&self, node: &DocumentNode, position: usize) -> Option<&str> {
        let index = self
            .by_node
            .get(&NodePtr::from_ref(node))
            .copied()
            .unwrap_or(position);
        self.texts.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Drives the citation processor once per export and holds its results.
pub struct CitationFormatter<'a> {
    settings: CitationSettings,
    texts: CitationTexts<'a>,
    bibliography_html: Vec<String>,
    parsed_bibliography: OnceCell<DocumentNode>,
}

impl<'a> CitationFormatter<'a> {
    pub async fn init(
        processor: &dyn CitationProcessor,
        citations: &[ExtractedCitation<'a>],
        settings: CitationSettings,
    ) -> Result<Self, CitationError> {
        let infos: Vec<CitationInfo> = citations.iter().map(|c| c.info.clone()).collect();
        let processed = processor.process(&infos, &settings).await?;
        tracing::debug!(
            processor = processor.name(),
            style = %settings.style,
            citations = infos.len(),
            entries = processed.bibliography.len(),
            "processed citations"
        );
        let texts = CitationTexts::new(citations, processed.citation_texts)?;
        Ok(Self {
            settings,
            texts,
            bibliography_html: processed.bibliography,
            parsed_bibliography: OnceCell::new(),
        })
    }

    pub fn citation_texts(&self) -> &CitationTexts<'a> {
        &self.texts
    }

    pub fn bibliography_header(&self) -> &str {
        &self.settings.bibliography_header
    }

    /// The formatted bibliography as a `cslbib` node with one `cslentry`
    /// child per entry. Parsed on first access, then cached.
    pub fn bibliography(&self) -> Result<&DocumentNode, CitationError> {
        self.parsed_bibliography
            .get_or_try_init(|| parse_bibliography(&self.bibliography_html))
    }

    /// `<bibl>` elements for the formatted bibliography, one per line.
    pub fn bibl_items(&self) -> Result<String, CitationError> {
        Ok(formatted_bibl_items(self.bibliography()?))
    }
}

/// One `<bibl>` per bibliography entry, with bare URLs and DOIs linked.
///
/// Only unlinked text is linkified; text under an `<a href>` keeps its `<ref>`.
pub fn formatted_bibl_items(bibliography: &DocumentNode) -> String {
    bibliography
        .children()
        .iter()
        .map(|entry| wrap("bibl", &bibl_content(entry), &[]))
        .collect::<Vec<_>>()
        .join("\n")
}

// Inline text is concatenated as is; nested entry blocks (left margin,
// right inline, ...) are separated by a space.
fn bibl_content(node: &DocumentNode) -> String {
    let mut out = String::new();
    for child in node.children() {
        if child.kind() == NodeKind::Text {
            out.push_str(&render_text_with(child, |text| linkify(&text)));
        } else {
            let block = bibl_content(child);
            if !out.is_empty() && !block.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
            out.push_str(&block);
        }
    }
    out
}
