/*
 * mark.rs
 * Copyright (c) 2025 Posit, PBC
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Inline formatting applied to a text node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkKind {
    Em,
    Strong,
    Link,
    Comment,
    /// Marks the exporter carries but does not render (sup, sub, smallcaps, ...).
    Other(String),
}

impl Mark {
    pub fn new(mark_type: impl Into<String>) -> Self {
        Self {
            mark_type: mark_type.into(),
            attrs: None,
        }
    }

    pub fn em() -> Self {
        Self::new("em")
    }

    pub fn strong() -> Self {
        Self::new("strong")
    }

    pub fn link(href: impl Into<String>) -> Self {
        let mut attrs = Map::new();
        attrs.insert("href".to_string(), Value::String(href.into()));
        Self {
            mark_type: "link".to_string(),
            attrs: Some(attrs),
        }
    }

    pub fn kind(&self) -> MarkKind {
        match self.mark_type.as_str() {
            "em" => MarkKind::Em,
            "strong" => MarkKind::Strong,
            "link" => MarkKind::Link,
            "comment" => MarkKind::Comment,
            other => MarkKind::Other(other.to_string()),
        }
    }

    /// Link target, if this mark carries a non-empty `href`.
    pub fn href(&self) -> Option<&str> {
        self.attrs
            .as_ref()
            .and_then(|a| a.get("href"))
            .and_then(Value::as_str)
            .filter(|h| !h.is_empty())
    }
}
