/*
 * escape_props.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Property tests: escaped text always yields well-formed XML that reads
 * back to the original string.
 */

use proptest::prelude::*;
use quick_xml::Reader;
use quick_xml::events::Event;
use tei_xml::{escape_attribute, escape_xml_text, linkify, tag, wrap_text};

/// Concatenated character data of a single-element document.
fn read_back(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => {
                let unescaped = t.unescape().map_err(|e| e.to_string())?;
                text.push_str(&unescaped);
            }
            Ok(Event::Eof) => return Ok(text),
            Ok(_) => {}
            Err(e) => return Err(e.to_string()),
        }
    }
}

fn attribute_value(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) => {
                let attr = e
                    .try_get_attribute("v")
                    .map_err(|e| e.to_string())?
                    .ok_or_else(|| "missing attribute".to_string())?;
                let value = attr.unescape_value().map_err(|e| e.to_string())?;
                return Ok(value.into_owned());
            }
            Ok(Event::Eof) => return Err("no element".to_string()),
            Ok(_) => {}
            Err(e) => return Err(e.to_string()),
        }
    }
}

proptest! {
    #[test]
    fn escaped_text_has_no_raw_metacharacters(s in "\\PC*") {
        let escaped = escape_xml_text(&s);
        prop_assert!(!escaped.contains('<'));
        prop_assert!(!escaped.contains('>'));
        for (i, _) in escaped.match_indices('&') {
            let rest = &escaped[i..];
            prop_assert!(
                rest.starts_with("&amp;") || rest.starts_with("&lt;") || rest.starts_with("&gt;")
            );
        }
    }

    #[test]
    fn escaping_only_touches_three_characters(s in "[^<>&]*") {
        prop_assert_eq!(escape_xml_text(&s), s);
    }

    #[test]
    fn wrapped_text_reads_back(s in "\\PC*") {
        let xml = wrap_text("p", &s, &[]);
        prop_assert_eq!(read_back(&xml), Ok(s));
    }

    #[test]
    fn escaped_attribute_reads_back(s in "\\PC*") {
        let escaped = escape_attribute(&s);
        let xml = tag("e", &[("v", &escaped)]);
        prop_assert_eq!(attribute_value(&xml), Ok(s));
    }

    #[test]
    fn linkify_ignores_text_without_links(s in "[a-zA-Z0-9 .,;]*") {
        prop_assert_eq!(linkify(&s), s);
    }

    #[test]
    fn linkified_text_stays_well_formed(
        before in "[a-z <>&]{0,10}",
        path in "[a-z0-9/]{1,10}",
        after in "[ .,a-z<>&]{0,10}",
    ) {
        let escaped = escape_xml_text(&format!("{before}https://example.org/{path}{after}"));
        let xml = format!("<p>{}</p>", linkify(&escaped));
        prop_assert!(read_back(&xml).is_ok(), "not well-formed: {}", xml);
    }
}
