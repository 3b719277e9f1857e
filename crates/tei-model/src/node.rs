/*
 * node.rs
 * Copyright (c) 2025 Posit, PBC
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mark::Mark;

/// One node of the editor document tree.
///
/// The same shape is used for top-level parts (`title`, `richtext_part`, ...),
/// block nodes and inline text. `content` distinguishes "absent" from
/// "empty": a paragraph without content renders differently from a paragraph
/// with an empty content list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<NodeAttrs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<DocumentNode>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Node attributes.
///
/// Footnote bodies are typed because the exporter walks into them; every
/// other attribute stays an open JSON value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footnote: Option<Vec<DocumentNode>>,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl NodeAttrs {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Truthiness of a flag attribute. Missing and non-boolean values are false.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(Value::Bool(true)))
    }

    /// Integer attribute, accepting both JSON numbers and numeric strings.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match self.values.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// String form of an identifier attribute that may be stored as a
    /// number or a string (image ids, reference ids).
    pub fn get_id(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

/// Closed set of node types the exporter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Paragraph,
    Heading(u8),
    Footnote,
    Figure,
    Image,
    FigureCaption,
    Table,
    TableBody,
    TableRow,
    TableHeader,
    TableCell,
    TableCaption,
    Blockquote,
    CodeBlock,
    OrderedList,
    BulletList,
    ListItem,
    Equation,
    Citation,
    CrossReference,
    Contributor,
    ContributorsPart,
    Tag,
    TagsPart,
    Title,
    RichtextPart,
    HeadingPart,
    Unknown,
}

impl NodeKind {
    pub fn from_type(node_type: &str) -> Self {
        match node_type {
            "text" => NodeKind::Text,
            "paragraph" => NodeKind::Paragraph,
            "footnote" => NodeKind::Footnote,
            "figure" => NodeKind::Figure,
            "image" => NodeKind::Image,
            "figure_caption" => NodeKind::FigureCaption,
            "table" => NodeKind::Table,
            "table_body" => NodeKind::TableBody,
            "table_row" => NodeKind::TableRow,
            "table_header" => NodeKind::TableHeader,
            "table_cell" => NodeKind::TableCell,
            "table_caption" => NodeKind::TableCaption,
            "blockquote" => NodeKind::Blockquote,
            "code_block" => NodeKind::CodeBlock,
            "ordered_list" => NodeKind::OrderedList,
            "bullet_list" => NodeKind::BulletList,
            "list_item" => NodeKind::ListItem,
            "equation" => NodeKind::Equation,
            "citation" => NodeKind::Citation,
            "cross_reference" => NodeKind::CrossReference,
            "contributor" => NodeKind::Contributor,
            "contributors_part" => NodeKind::ContributorsPart,
            "tag" => NodeKind::Tag,
            "tags_part" => NodeKind::TagsPart,
            "title" => NodeKind::Title,
            "richtext_part" => NodeKind::RichtextPart,
            "heading_part" => NodeKind::HeadingPart,
            other => Self::heading_level(other)
                .map(NodeKind::Heading)
                .unwrap_or(NodeKind::Unknown),
        }
    }

    /// `heading1` .. `heading9`; the level is the trailing digit.
    fn heading_level(node_type: &str) -> Option<u8> {
        let digit = node_type.strip_prefix("heading")?;
        match digit.as_bytes() {
            [d @ b'1'..=b'9'] => Some(d - b'0'),
            _ => None,
        }
    }

    /// Nodes whose children are inline content joined without separators.
    pub fn is_textblock(self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph
                | NodeKind::Heading(_)
                | NodeKind::CodeBlock
                | NodeKind::FigureCaption
                | NodeKind::TableCaption
                | NodeKind::Title
        )
    }
}

impl DocumentNode {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            ..Default::default()
        }
    }

    /// A text leaf.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            node_type: "text".to_string(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: Vec<DocumentNode>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attrs
            .get_or_insert_with(NodeAttrs::default)
            .values
            .insert(key.to_string(), value.into());
        self
    }

    pub fn with_footnote(mut self, body: Vec<DocumentNode>) -> Self {
        self.attrs.get_or_insert_with(NodeAttrs::default).footnote = Some(body);
        self
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.push(mark);
        self
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from_type(&self.node_type)
    }

    /// Children, or an empty slice when `content` is absent.
    pub fn children(&self) -> &[DocumentNode] {
        self.content.as_deref().unwrap_or(&[])
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.as_ref().and_then(|a| a.get_str(key))
    }

    pub fn attr_flag(&self, key: &str) -> bool {
        self.attrs.as_ref().is_some_and(|a| a.flag(key))
    }

    pub fn attr_u64(&self, key: &str) -> Option<u64> {
        self.attrs.as_ref().and_then(|a| a.get_u64(key))
    }

    pub fn attr_id(&self, key: &str) -> Option<String> {
        self.attrs.as_ref().and_then(|a| a.get_id(key))
    }

    /// Body of a footnote node, empty for every other node.
    pub fn footnote_body(&self) -> &[DocumentNode] {
        self.attrs
            .as_ref()
            .and_then(|a| a.footnote.as_deref())
            .unwrap_or(&[])
    }

    /// First direct child of the given kind.
    pub fn child_of_kind(&self, kind: NodeKind) -> Option<&DocumentNode> {
        self.children().iter().find(|c| c.kind() == kind)
    }
}
