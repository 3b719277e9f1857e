/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Export rich-text documents to TEI XML.
//!
//! ```rust,no_run
//! use tei_export::{ExportDocument, TeiExporter};
//!
//! # fn main() -> tei_export::Result<()> {
//! let doc = ExportDocument::from_file(std::path::Path::new("paper.json"))?;
//! let mut exporter = TeiExporter::default();
//! let output = pollster::block_on(exporter.export(&doc))?;
//! std::fs::write(&output.filename, &output.tei)?;
//! # Ok(())
//! # }
//! ```
//!
//! A document check failure ([`ExportError::CheckFailed`]) means the
//! document was rejected by a business rule such as the abstract word limit
//! and should be reported as a warning; every other error is unexpected.

pub mod checks;
pub mod citations;
pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod extract;
pub mod images;
pub mod math;
pub mod render;
pub mod slug;
pub mod templates;

pub use citations::{CitationProcessor, PrecomputedCitations, ProcessedCitations};
pub use config::{BibliographyMode, ExportConfig, WordLimit};
pub use error::{DocumentCheckFailed, ExportError, Result};
pub use export::{DocumentSettings, ExportDocument, ExportOutput, ImageFile, TeiExporter};
pub use extract::ExtractedFields;
pub use images::{ImageDb, ImageLookup};
pub use math::{CommandEngine, MathAdapter, MathEngine, TexAnnotationEngine};
