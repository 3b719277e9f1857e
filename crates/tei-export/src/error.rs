/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for the TEI exporter.
//!
//! Errors fall into two tiers. [`DocumentCheckFailed`] is a business-rule
//! rejection (the document is fine, it just may not be exported yet) and
//! should be shown as a warning. Everything else is an unexpected failure.

use thiserror::Error;

/// A document check rejected the export.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DocumentCheckFailed {
    pub message: String,
}

impl DocumentCheckFailed {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum MathError {
    #[error("math converter used before initialization")]
    NotInitialized,

    #[error("failed to convert `{latex}`: {message}")]
    Conversion { latex: String, message: String },

    #[error("math converter I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CitationError {
    #[error("citation processor failed: {0}")]
    Processor(String),

    #[error("citation processor returned {actual} texts for {expected} citations")]
    Misaligned { expected: usize, actual: usize },

    #[error("could not parse bibliography markup: {0}")]
    Bibliography(String),

    #[error("citation data I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid citation data: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no citation text for citation #{index}")]
    MissingCitationText { index: usize },

    #[error(transparent)]
    Math(#[from] MathError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("{0}")]
    CheckFailed(#[from] DocumentCheckFailed),

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Citation(#[from] CitationError),

    #[error(transparent)]
    Math(#[from] MathError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExportError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDocument(msg.into())
    }

    /// True for business-rule rejections that should surface as warnings.
    pub fn is_check_failure(&self) -> bool {
        matches!(self, ExportError::CheckFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_failure_is_distinguishable() {
        let check: ExportError = DocumentCheckFailed::new("Abstract exceeds 5 words").into();
        assert!(check.is_check_failure());
        assert_eq!(check.to_string(), "Abstract exceeds 5 words");

        let other = ExportError::malformed("no body part");
        assert!(!other.is_check_failure());
        assert_eq!(other.to_string(), "malformed document: no body part");
    }

    #[test]
    fn test_render_error_wraps_math() {
        let err: ExportError = RenderError::from(MathError::NotInitialized).into();
        assert!(!err.is_check_failure());
        assert_eq!(
            err.to_string(),
            "render error: math converter used before initialization"
        );
    }
}
