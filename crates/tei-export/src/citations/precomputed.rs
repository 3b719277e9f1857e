/*
 * citations/precomputed.rs
 * Copyright (c) 2025 Posit, PBC
 */

use std::path::Path;

use async_trait::async_trait;
use tei_model::CitationInfo;

use super::{CitationProcessor, CitationSettings, ProcessedCitations};
use crate::error::CitationError;

/// Citation output computed ahead of time by an external CSL run.
///
/// JSON form:
///
/// ```json
/// {
///   "citation_texts": ["(Doe 2020)", "(Roe 2019, 12)"],
///   "bibliography": ["<div class=\"csl-entry\">Doe, J. 2020. ...</div>"]
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrecomputedCitations {
    result: ProcessedCitations,
}

impl PrecomputedCitations {
    pub fn new(citation_texts: Vec<String>, bibliography: Vec<String>) -> Self {
        Self {
            result: ProcessedCitations {
                citation_texts,
                bibliography,
            },
        }
    }

    /// No citations, no bibliography.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, CitationError> {
        Ok(Self {
            result: serde_json::from_str(json)?,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, CitationError> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}

#[async_trait]
impl CitationProcessor for PrecomputedCitations {
    fn name(&self) -> &str {
        "precomputed"
    }

    async fn process(
        &self,
        citations: &[CitationInfo],
        settings: &CitationSettings,
    ) -> Result<ProcessedCitations, CitationError> {
        if citations.len() != self.result.citation_texts.len() {
            tracing::warn!(
                citations = citations.len(),
                texts = self.result.citation_texts.len(),
                style = %settings.style,
                "precomputed citation texts do not match the document"
            );
        }
        Ok(self.result.clone())
    }
}
