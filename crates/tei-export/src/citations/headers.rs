/*
 * citations/headers.rs
 * Copyright (c) 2025 Posit, PBC
 */

use std::collections::BTreeMap;

const FALLBACK_HEADER: &str = "Bibliography";

/// Built-in bibliography headers by primary language subtag.
const BIBLIOGRAPHY_HEADERS: [(&str, &str); 14] = [
    ("cs", "Bibliografie"),
    ("da", "Bibliografi"),
    ("de", "Bibliographie"),
    ("en", "Bibliography"),
    ("es", "Bibliografía"),
    ("fi", "Lähdeluettelo"),
    ("fr", "Bibliographie"),
    ("it", "Bibliografia"),
    ("nb", "Bibliografi"),
    ("nl", "Bibliografie"),
    ("pl", "Bibliografia"),
    ("pt", "Bibliografia"),
    ("ru", "Библиография"),
    ("sv", "Bibliografi"),
];

/// Header of the bibliography list for a document language.
///
/// User overrides win (exact tag first, then primary subtag), then the
/// built-in table, then English.
pub fn bibliography_header(language: &str, overrides: &BTreeMap<String, String>) -> String {
    let primary = language
        .split(['-', '_'])
        .next()
        .unwrap_or(language)
        .to_ascii_lowercase();
    overrides
        .get(language)
        .or_else(|| overrides.get(&primary))
        .map(String::as_str)
        .or_else(|| {
            BIBLIOGRAPHY_HEADERS
                .iter()
                .find(|(lang, _)| *lang == primary)
                .map(|(_, header)| *header)
        })
        .unwrap_or(FALLBACK_HEADER)
        .to_string()
}
