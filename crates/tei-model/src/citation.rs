/*
 * citation.rs
 * Copyright (c) 2025 Posit, PBC
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::node::DocumentNode;

/// Citation metadata carried by a `citation` node.
///
/// The exporter treats this as opaque data for the citation processor;
/// only the referenced ids are inspected (for the structured bibliography).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitationInfo(pub Map<String, Value>);

impl CitationInfo {
    /// Deep copy of a citation node's attributes.
    pub fn from_node(node: &DocumentNode) -> Self {
        Self(
            node.attrs
                .as_ref()
                .map(|a| a.values.clone())
                .unwrap_or_default(),
        )
    }

    /// Citation format, e.g. `autocite` or `textcite`.
    pub fn format(&self) -> Option<&str> {
        self.0.get("format").and_then(Value::as_str)
    }

    /// Ids of the bibliography entries this citation points at, in order.
    pub fn reference_ids(&self) -> Vec<String> {
        let Some(Value::Array(references)) = self.0.get("references") else {
            return Vec::new();
        };
        references
            .iter()
            .filter_map(|r| match r.get("id")? {
                Value::Number(n) => Some(n.to_string()),
                Value::String(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }
}
