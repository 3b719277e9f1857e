/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Exporter configuration.
//!
//! Every field has a default, so an empty YAML file (or no file at all) is a
//! valid configuration. Keys are kebab-case:
//!
//! ```yaml
//! publication-statement: DHd 2025
//! abstract-word-limit: 250   # -1 disables the check
//! language: de-DE
//! bibliography-header:
//!   de-DE: Literatur
//! bibliography-mode: structured
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_ABSTRACT_WORD_LIMIT: usize = 200;

/// Upper bound on abstract length, or no check at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum WordLimit {
    Disabled,
    Max(usize),
}

impl Default for WordLimit {
    fn default() -> Self {
        WordLimit::Max(DEFAULT_ABSTRACT_WORD_LIMIT)
    }
}

impl TryFrom<i64> for WordLimit {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(WordLimit::Disabled),
            n if n >= 0 => usize::try_from(n)
                .map(WordLimit::Max)
                .map_err(|e| e.to_string()),
            n => Err(format!("word limit must be -1 or non-negative, got {n}")),
        }
    }
}

impl From<WordLimit> for i64 {
    fn from(limit: WordLimit) -> Self {
        match limit {
            WordLimit::Disabled => -1,
            WordLimit::Max(n) => i64::try_from(n).unwrap_or(i64::MAX),
        }
    }
}

/// How the `<listBibl>` entries are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BibliographyMode {
    /// One `<bibl>` per entry of the citation processor's formatted bibliography.
    #[default]
    Formatted,
    /// One structured `<bibl>` (author, title, idno, ...) per cited database entry.
    Structured,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExportConfig {
    /// Content of `<publicationStmt><publisher>`.
    pub publication_statement: String,
    /// Content of `<sourceDesc><p>`.
    pub source_description: String,
    pub abstract_word_limit: WordLimit,
    /// Citation style name handed to the citation processor.
    pub citation_style: String,
    /// Document language, used for the bibliography header.
    pub language: String,
    /// Per-language bibliography header overrides.
    pub bibliography_header: BTreeMap<String, String>,
    pub bibliography_mode: BibliographyMode,
    /// `scheme` attribute of the `<keywords>` classes.
    pub keyword_scheme: String,
    /// Label prefix in figure heads ("Figure 1: ...").
    pub figure_label: String,
    /// `rend` attribute of sections opened by headings.
    pub section_rend: String,
    /// Fixed edition date (YYYY-MM-DD); today when unset.
    pub date: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            publication_statement: "Unpublished manuscript".to_string(),
            source_description: "Born-digital document exported from a rich-text editor"
                .to_string(),
            abstract_word_limit: WordLimit::default(),
            citation_style: "apa".to_string(),
            language: "en-US".to_string(),
            bibliography_header: BTreeMap::new(),
            bibliography_mode: BibliographyMode::default(),
            keyword_scheme: "ConfTool".to_string(),
            figure_label: "Figure".to_string(),
            section_rend: "DH-Heading".to_string(),
            date: None,
        }
    }
}

impl ExportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::debug!(path = %path.display(), "loaded export configuration");
        Ok(config)
    }

    pub fn with_abstract_word_limit(mut self, limit: WordLimit) -> Self {
        self.abstract_word_limit = limit;
        self
    }

    pub fn with_publication_statement(mut self, statement: impl Into<String>) -> Self {
        self.publication_statement = statement.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_bibliography_mode(mut self, mode: BibliographyMode) -> Self {
        self.bibliography_mode = mode;
        self
    }

    pub fn with_figure_label(mut self, label: impl Into<String>) -> Self {
        self.figure_label = label.into();
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// The configured edition date, parsed.
    pub fn edition_date(&self) -> Result<Option<NaiveDate>, ConfigError> {
        self.date
            .as_deref()
            .map(|d| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .map_err(|_| ConfigError::InvalidDate(d.to_string()))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.abstract_word_limit, WordLimit::Max(200));
        assert_eq!(config.keyword_scheme, "ConfTool");
        assert_eq!(config.figure_label, "Figure");
        assert_eq!(config.bibliography_mode, BibliographyMode::Formatted);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(
            ExportConfig::from_yaml_str("").unwrap(),
            ExportConfig::default()
        );
    }

    #[test]
    fn test_yaml_overrides() {
        let config = ExportConfig::from_yaml_str(
            "abstract-word-limit: -1\n\
             language: de-DE\n\
             bibliography-mode: structured\n\
             bibliography-header:\n  de-DE: Literatur\n",
        )
        .unwrap();
        assert_eq!(config.abstract_word_limit, WordLimit::Disabled);
        assert_eq!(config.language, "de-DE");
        assert_eq!(config.bibliography_mode, BibliographyMode::Structured);
        assert_eq!(config.bibliography_header["de-DE"], "Literatur");
        // untouched keys keep their defaults
        assert_eq!(config.section_rend, "DH-Heading");
    }

    #[test]
    fn test_invalid_word_limit() {
        assert!(ExportConfig::from_yaml_str("abstract-word-limit: -5").is_err());
    }

    #[test]
    fn test_word_limit_roundtrips_through_i64() {
        assert_eq!(i64::from(WordLimit::Disabled), -1);
        assert_eq!(WordLimit::try_from(12_i64), Ok(WordLimit::Max(12)));
    }

    #[test]
    fn test_edition_date() {
        let config = ExportConfig::new().with_date("2025-03-01");
        assert_eq!(
            config.edition_date().unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert!(matches!(
            ExportConfig::new().with_date("March").edition_date(),
            Err(ConfigError::InvalidDate(_))
        ));
        assert_eq!(ExportConfig::new().edition_date().unwrap(), None);
    }
}
