/*
 * checks.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Business-rule checks run before rendering. A failure aborts the export
//! with [`DocumentCheckFailed`], which callers report as a warning.

use tei_model::{DocumentNode, text_content};

use crate::config::{ExportConfig, WordLimit};
use crate::error::DocumentCheckFailed;
use crate::extract::ExtractedFields;

/// Number of whitespace-delimited words in a subtree.
pub fn word_count(node: &DocumentNode) -> usize {
    text_content(node).split_whitespace().count()
}

pub fn check_abstract_words(
    abstract_part: &DocumentNode,
    limit: WordLimit,
) -> Result<(), DocumentCheckFailed> {
    let WordLimit::Max(max) = limit else {
        return Ok(());
    };
    let words = word_count(abstract_part);
    if words > max {
        tracing::debug!(words, limit = max, "abstract too long");
        return Err(DocumentCheckFailed::new(format!(
            "Abstract exceeds {max} words"
        )));
    }
    Ok(())
}

pub fn run_checks(
    fields: &ExtractedFields<'_>,
    config: &ExportConfig,
) -> Result<(), DocumentCheckFailed> {
    if let Some(abstract_part) = fields.abstract_part {
        check_abstract_words(abstract_part, config.abstract_word_limit)?;
    }
    Ok(())
}
