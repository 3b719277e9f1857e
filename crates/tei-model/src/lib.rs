/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Document model type definitions for the TEI exporter.
 *
 * This crate provides the tree-shaped rich-document model produced by
 * the editor (parts, blocks, inline text with marks), the citation and
 * bibliography metadata attached to it, and the copy-before-mutate
 * preprocessing helpers. It has no knowledge of TEI itself.
 */

pub mod bibliography;
pub mod citation;
pub mod mark;
pub mod node;
pub mod preprocess;
pub mod text;

// Re-export commonly used types at the crate root
pub use bibliography::{BibDb, BibEntry, BibFields, BibName};
pub use citation::CitationInfo;
pub use mark::{Mark, MarkKind};
pub use node::{DocumentNode, NodeAttrs, NodeKind};
pub use preprocess::{prepare_for_export, remove_hidden, strip_comment_marks};
pub use text::{text_content, text_nodes};
