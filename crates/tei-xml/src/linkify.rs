/*
 * linkify.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Turn bare URLs and DOIs in already-escaped text into TEI link elements.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::markup::{link_ptr, link_ref};

const DOI_RESOLVER: &str = "https://doi.org/";

// Both patterns in one alternation so a single left-to-right pass never
// rewrites text that an earlier replacement produced.
static LINK_OR_DOI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)(?P<url>\b(?:https?|ftp|file)://[-A-Z0-9+&@#/%?=~_|!:,.;]*[-A-Z0-9+&@#/%=~_|])",
        r"|(?P<prefix>doi:)(?P<doi>10\.[0-9]{4,9}/[-._;()/:A-Z0-9]+)",
    ))
    .expect("link pattern is valid")
});

/// Replace bare `http(s)`, `ftp` and `file` URLs with `<ptr target="..." />`
/// and `doi:10.NNNN/...` tokens with a `<ref>` to the doi.org resolver.
///
/// Input is escaped XML text (it may already contain markup such as
/// `<hi>`); a trailing `.` or `,` is kept outside the generated element.
///
/// ```rust
/// use tei_xml::linkify;
///
/// assert_eq!(
///     linkify("See https://example.com/1, more"),
///     r#"See <ptr target="https://example.com/1" />, more"#
/// );
/// ```
pub fn linkify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in LINK_OR_DOI.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() < last {
            continue;
        }
        if let Some(url) = caps.name("url") {
            let end = settle_url_end(text, url.start(), url.end());
            let target = &text[url.start()..end];
            if target.ends_with("://") {
                continue;
            }
            out.push_str(&text[last..url.start()]);
            out.push_str(&link_ptr(target));
            last = end;
        } else if let (Some(prefix), Some(doi)) = (caps.name("prefix"), caps.name("doi")) {
            let doi_text = doi.as_str();
            let doi_text = doi_text
                .strip_suffix(['.', ','])
                .unwrap_or(doi_text);
            out.push_str(&text[last..prefix.start()]);
            out.push_str(&link_ref(
                &format!("{DOI_RESOLVER}{doi_text}"),
                &format!("{}{doi_text}", prefix.as_str()),
            ));
            last = doi.start() + doi_text.len();
        }
    }
    out.push_str(&text[last..]);
    out
}

/// Adjust a URL match so it never splits an escaped entity.
///
/// `&lt;` and `&gt;` cannot occur in a URL, so the URL stops before them.
/// A match ending in the middle of an entity (`...&amp` followed by `;`)
/// is extended to close it.
fn settle_url_end(text: &str, start: usize, end: usize) -> usize {
    let url = &text[start..end];
    let cut = ["&lt;", "&gt;", "&lt", "&gt"]
        .iter()
        .filter_map(|e| url.find(e))
        .min();
    if let Some(cut) = cut {
        return start + trim_url_tail(&url[..cut]).len();
    }
    if has_open_entity(url) && text[end..].starts_with(';') {
        return end + 1;
    }
    end
}

fn has_open_entity(url: &str) -> bool {
    url.rfind('&').is_some_and(|amp| {
        let tail = &url[amp + 1..];
        !tail.is_empty()
            && !tail.contains(';')
            && tail.chars().all(|c| c.is_ascii_alphanumeric() || c == '#')
    })
}

fn trim_url_tail(url: &str) -> &str {
    let mut url = url;
    loop {
        match url.chars().last() {
            Some(';') if has_open_entity(&url[..url.len() - 1]) => return url,
            Some('!' | ':' | ',' | '.' | ';' | '?') => url = &url[..url.len() - 1],
            _ => return url,
        }
    }
}
