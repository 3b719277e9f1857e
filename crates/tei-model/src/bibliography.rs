/*
 * bibliography.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Bibliography database as stored alongside a document.
//!
//! Field values are rich text (sequences of text nodes with marks), so
//! formatting such as italics or small caps in a title survives into the
//! structured bibliography output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::node::DocumentNode;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BibDb {
    #[serde(default)]
    pub db: BTreeMap<String, BibEntry>,
}

impl BibDb {
    pub fn get(&self, id: &str) -> Option<&BibEntry> {
        self.db.get(id)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BibEntry {
    #[serde(default)]
    pub bib_type: String,
    #[serde(default)]
    pub cite_key: String,
    #[serde(default)]
    pub fields: BibFields,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BibFields {
    pub author: Option<Vec<BibName>>,
    pub editor: Option<Vec<BibName>>,
    pub editora: Option<Vec<BibName>>,
    pub title: Option<Vec<DocumentNode>>,
    pub date: Option<String>,
    pub doi: Option<String>,
    pub url: Option<String>,
    pub isbn: Option<Vec<DocumentNode>>,
    pub issn: Option<Vec<DocumentNode>>,
    pub journaltitle: Option<Vec<DocumentNode>>,
    pub issue: Option<Vec<DocumentNode>>,
    pub edition: Option<Vec<DocumentNode>>,
    pub publisher: Option<Vec<Vec<DocumentNode>>>,
    pub location: Option<Vec<Vec<DocumentNode>>>,
}

/// A person or organization name.
///
/// Organizations only carry `literal`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BibName {
    pub family: Vec<DocumentNode>,
    pub given: Vec<DocumentNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<Vec<DocumentNode>>,
}
