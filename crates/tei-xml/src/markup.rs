/*
 * markup.rs
 * Copyright (c) 2025 Posit, PBC
 */

use std::fmt::Write;

use crate::escape::escape_xml_text;

fn open(out: &mut String, name: &str, attrs: &[(&str, &str)]) {
    out.push('<');
    out.push_str(name);
    for (key, value) in attrs {
        // String writes are infallible
        let _ = write!(out, " {key}=\"{value}\"");
    }
}

/// Self-closing empty element: `<name />` or `<name k="v" />`.
pub fn tag(name: &str, attrs: &[(&str, &str)]) -> String {
    let mut out = String::new();
    open(&mut out, name, attrs);
    out.push_str(" />");
    out
}

/// Element with already-formed content.
pub fn wrap(name: &str, content: &str, attrs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(content.len() + 2 * name.len() + 5);
    open(&mut out, name, attrs);
    out.push('>');
    out.push_str(content);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
    out
}

/// Escape leaf text, then wrap it.
pub fn wrap_text(name: &str, text: &str, attrs: &[(&str, &str)]) -> String {
    wrap(name, &escape_xml_text(text), attrs)
}

/// `<ref target="TARGET">TEXT</ref>`
pub fn link_ref(target: &str, text: &str) -> String {
    wrap("ref", text, &[("target", target)])
}

/// `<ptr target="TARGET" />`
pub fn link_ptr(target: &str) -> String {
    tag("ptr", &[("target", target)])
}
