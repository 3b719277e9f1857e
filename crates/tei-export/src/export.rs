/*
 * export.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Export pipeline: document in, TEI bytes plus image list out.
//!
//! ```text
//! prepare (copy) -> extract -> checks -> {citations, math} init
//!   -> render abstract and body -> bibliography -> templates
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tei_model::{BibDb, CitationInfo, DocumentNode, prepare_for_export};

use crate::checks::run_checks;
use crate::citations::{
    CitationFormatter, CitationProcessor, CitationSettings, PrecomputedCitations,
    bibliography_header, structured_bibl_items,
};
use crate::config::{BibliographyMode, ExportConfig};
use crate::convert;
use crate::error::Result;
use crate::extract::ExtractedFields;
use crate::images::{ImageDb, ImageLookup, embedded_filename};
use crate::math::{MathAdapter, MathEngine};
use crate::render::{RenderContext, RenderOptions, render_rich_text};
use crate::slug::create_slug;
use crate::templates::{HeaderFragments, tei_back, tei_document, tei_header};

/// Per-document settings stored alongside the content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citationstyle: Option<String>,
    /// Language → bibliography header.
    #[serde(default)]
    pub bibliography_header: BTreeMap<String, String>,
}

/// A document as handed to the exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: DocumentNode,
    #[serde(default)]
    pub settings: DocumentSettings,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentInput {
    Wrapped(ExportDocument),
    Bare(DocumentNode),
}

impl ExportDocument {
    pub fn new(content: DocumentNode) -> Self {
        Self {
            title: None,
            content,
            settings: DocumentSettings::default(),
        }
    }

    /// Parse either `{"title": .., "content": {..}, "settings": {..}}` or a
    /// bare `doc` node.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(match serde_json::from_str(json)? {
            DocumentInput::Wrapped(doc) => doc,
            DocumentInput::Bare(content) => Self::new(content),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}

/// An image the TEI file refers to, to be packaged next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    /// Path inside the package, `images/NAME`.
    pub filename: String,
    pub source_path: String,
}

#[derive(Debug, Clone)]
pub struct ExportOutput {
    /// `SLUG.tei.xml`
    pub filename: String,
    /// UTF-8 TEI document.
    pub tei: Vec<u8>,
    pub images: Vec<ImageFile>,
}

impl ExportOutput {
    /// Write the TEI file into `dir` and return its path.
    pub fn write_to_dir(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.tei)?;
        Ok(path)
    }
}

/// Exports documents to TEI.
///
/// Collaborators default to an empty image database, no citations, and the
/// TeX-annotation math engine.
pub struct TeiExporter {
    config: ExportConfig,
    images: Box<dyn ImageLookup>,
    citations: Box<dyn CitationProcessor>,
    math: MathAdapter,
    bibliography: Option<BibDb>,
}

impl Default for TeiExporter {
    fn default() -> Self {
        Self::new(ExportConfig::default())
    }
}

impl TeiExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            images: Box::new(ImageDb::default()),
            citations: Box::new(PrecomputedCitations::empty()),
            math: MathAdapter::default(),
            bibliography: None,
        }
    }

    pub fn with_images(mut self, images: impl ImageLookup + 'static) -> Self {
        self.images = Box::new(images);
        self
    }

    pub fn with_citation_processor(mut self, processor: impl CitationProcessor + 'static) -> Self {
        self.citations = Box::new(processor);
        self
    }

    pub fn with_math_engine(mut self, engine: impl MathEngine + 'static) -> Self {
        self.math = MathAdapter::new(Box::new(engine));
        self
    }

    /// Bibliography database, used by the structured bibliography mode.
    pub fn with_bibliography(mut self, bibliography: BibDb) -> Self {
        self.bibliography = Some(bibliography);
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.config.date = Some(date.into());
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub async fn export(&mut self, doc: &ExportDocument) -> Result<ExportOutput> {
        let content = prepare_for_export(&doc.content);
        let fields = ExtractedFields::from_document(&content)?;
        run_checks(&fields, &self.config)?;

        let date = match self.config.edition_date()? {
            Some(date) => date,
            None => Local::now().date_naive(),
        }
        .format("%Y-%m-%d")
        .to_string();

        self.math.init().await?;
        let settings = self.citation_settings(&doc.settings);
        let formatter =
            CitationFormatter::init(self.citations.as_ref(), &fields.citations, settings).await?;

        let options = RenderOptions::from(&self.config);
        let ctx = RenderContext {
            images: self.images.as_ref(),
            citations: formatter.citation_texts(),
            math: &self.math,
            options: &options,
        };

        let abstract_text = match fields.abstract_part {
            Some(part) => {
                let rendered = render_rich_text(part.children(), &ctx)?;
                if !rendered.notes.is_empty() {
                    tracing::warn!(
                        footnotes = rendered.notes.len(),
                        "footnotes in the abstract are not exported"
                    );
                }
                rendered.text
            }
            None => String::new(),
        };
        let body = render_rich_text(fields.body.children(), &ctx)?;

        let bibl_items = self.bibl_items(&fields, &formatter)?;
        let header = tei_header(&HeaderFragments {
            title: &convert::main_title(&fields.title),
            subtitle: &convert::subtitle(&fields.subtitle),
            authors: &convert::authors(&fields.authors, &fields.orcid_ids),
            date: &date,
            publication_statement: &tei_xml::escape_xml_text(&self.config.publication_statement),
            source_description: &tei_xml::escape_xml_text(&self.config.source_description),
            abstract_text: &abstract_text,
            keywords: &convert::keyword_classes(&fields, &self.config.keyword_scheme),
        });
        let back = tei_back(
            &body.notes_div(),
            &tei_xml::escape_xml_text(formatter.bibliography_header()),
            &bibl_items,
        );

        let title = doc
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&fields.title);
        let slug = create_slug(title);
        let tei = tei_document(&slug, &header, &body.text, &back);
        let images = self.image_files(&fields.image_ids);

        tracing::info!(
            slug = %slug,
            bytes = tei.len(),
            images = images.len(),
            footnotes = body.notes.len(),
            "exported TEI document"
        );
        Ok(ExportOutput {
            filename: format!("{slug}.tei.xml"),
            tei: tei.into_bytes(),
            images,
        })
    }

    /// Document settings win over the configuration.
    fn citation_settings(&self, doc: &DocumentSettings) -> CitationSettings {
        let language = doc
            .language
            .clone()
            .unwrap_or_else(|| self.config.language.clone());
        let style = doc
            .citationstyle
            .clone()
            .unwrap_or_else(|| self.config.citation_style.clone());
        let mut overrides = self.config.bibliography_header.clone();
        overrides.extend(doc.bibliography_header.clone());
        CitationSettings {
            bibliography_header: bibliography_header(&language, &overrides),
            style,
            language,
        }
    }

    fn bibl_items(
        &self,
        fields: &ExtractedFields<'_>,
        formatter: &CitationFormatter<'_>,
    ) -> Result<String> {
        if self.config.bibliography_mode == BibliographyMode::Structured {
            if let Some(db) = &self.bibliography {
                let infos: Vec<CitationInfo> =
                    fields.citations.iter().map(|c| c.info.clone()).collect();
                return Ok(structured_bibl_items(db, &infos));
            }
            tracing::warn!("structured bibliography requested without a bibliography database");
        }
        Ok(formatter.bibl_items()?)
    }

    /// Referenced images in document order, one per package filename.
    fn image_files(&self, image_ids: &[String]) -> Vec<ImageFile> {
        let mut seen = HashSet::new();
        image_ids
            .iter()
            .filter_map(|id| self.images.image_path(id))
            .map(|path| ImageFile {
                filename: format!("images/{}", embedded_filename(path)),
                source_path: path.to_string(),
            })
            .filter(|file| seen.insert(file.filename.clone()))
            .collect()
    }
}
