/*
 * slug.rs
 * Copyright (c) 2025 Posit, PBC
 */

use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s-]").expect("slug pattern is valid"));
static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s-]+").expect("separator pattern is valid"));

/// File-name safe identifier derived from a document title.
///
/// The slug doubles as the `xml:id` of the TEI root, so it never starts
/// with a digit and is never empty.
pub fn create_slug(title: &str) -> String {
    let cleaned = NON_SLUG_CHARS.replace_all(title, "");
    let dashed = SEPARATORS.replace_all(cleaned.trim(), "-");
    let slug = dashed.trim_matches('-').to_ascii_lowercase();
    match slug.chars().next() {
        None => "untitled".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{slug}"),
        Some(_) => slug,
    }
}
