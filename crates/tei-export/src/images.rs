/*
 * images.rs
 * Copyright (c) 2025 Posit, PBC
 */

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Resolves the opaque image ids found in figures to file paths.
pub trait ImageLookup {
    fn image_path(&self, id: &str) -> Option<&str>;
}

/// Image database as stored with a document: `{"db": {"12": {"image": "/media/x.png"}}}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageDb {
    #[serde(default)]
    pub db: BTreeMap<String, ImageEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageEntry {
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ImageDb {
    pub fn insert(&mut self, id: impl Into<String>, path: impl Into<String>) {
        self.db.insert(
            id.into(),
            ImageEntry {
                image: path.into(),
                title: None,
            },
        );
    }

    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

impl ImageLookup for ImageDb {
    fn image_path(&self, id: &str) -> Option<&str> {
        self.db.get(id).map(|e| e.image.as_str())
    }
}

/// File name under which an image is embedded: the last path segment.
pub fn embedded_filename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
