/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! String-level XML primitives used to build TEI output.
//!
//! Everything here produces markup by string composition. The helpers do
//! not escape attribute values or content on their own; callers escape user
//! text with [`escape_xml_text`] (text nodes) or [`escape_attribute`]
//! (attribute values) before handing it in.
//!
//! ```rust
//! use tei_xml::{tag, wrap, wrap_text};
//!
//! assert_eq!(tag("lb", &[]), "<lb />");
//! assert_eq!(wrap("hi", "x", &[("rend", "italic")]), r#"<hi rend="italic">x</hi>"#);
//! assert_eq!(wrap_text("p", "a < b", &[]), "<p>a &lt; b</p>");
//! ```

pub mod escape;
pub mod linkify;
pub mod markup;

pub use escape::{escape_attribute, escape_xml_text};
pub use linkify::linkify;
pub use markup::{link_ptr, link_ref, tag, wrap, wrap_text};
