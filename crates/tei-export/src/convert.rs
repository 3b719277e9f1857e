/*
 * convert.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Header fragments built from extracted fields. Every value coming from
//! the document is escaped here; the templates insert fragments verbatim.

use tei_xml::{escape_attribute, wrap, wrap_text};

use crate::extract::{Author, ExtractedFields, TAG_SECTIONS};

/// One `<author>` per contributor, one per line.
///
/// `orcid_ids` is aligned with `authors`; empty entries produce no `<idno>`.
pub fn authors(authors: &[Author], orcid_ids: &[String]) -> String {
    authors
        .iter()
        .enumerate()
        .map(|(i, author)| {
            let name = wrap(
                "persName",
                &format!(
                    "{}{}",
                    wrap_text("surname", &author.lastname, &[]),
                    wrap_text("forename", &author.firstname, &[])
                ),
                &[],
            );
            let orcid = match orcid_ids.get(i) {
                Some(id) if !id.is_empty() => wrap_text("idno", id, &[("type", "ORCID")]),
                _ => String::new(),
            };
            wrap(
                "author",
                &format!(
                    "{name}{}{}{orcid}",
                    wrap_text("affiliation", &author.institution, &[]),
                    wrap_text("email", &author.email, &[])
                ),
                &[],
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A `<keywords>` class for one tag section, `""` when it has no terms.
pub fn keywords(section: &str, terms: &[String], scheme: &str) -> String {
    if terms.is_empty() {
        return String::new();
    }
    let content = terms
        .iter()
        .map(|term| wrap_text("term", term, &[]))
        .collect::<Vec<_>>()
        .join("\n");
    wrap(
        "keywords",
        &content,
        &[
            ("n", escape_attribute(section).as_str()),
            ("scheme", escape_attribute(scheme).as_str()),
        ],
    )
}

/// Keyword classes for every exported tag section, in header order.
pub fn keyword_classes(fields: &ExtractedFields<'_>, scheme: &str) -> String {
    TAG_SECTIONS
        .iter()
        .map(|section| keywords(section, fields.tag_section(section), scheme))
        .filter(|class| !class.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn main_title(title: &str) -> String {
    wrap_text("title", title, &[("type", "main")])
}

/// `<title type="sub">`, or `""` for an empty subtitle.
pub fn subtitle(subtitle: &str) -> String {
    if subtitle.is_empty() {
        return String::new();
    }
    wrap_text("title", subtitle, &[("type", "sub")])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> Author {
        Author {
            firstname: "Jane".to_string(),
            lastname: "Doe".to_string(),
            institution: "Uni A & B".to_string(),
            email: "jane@example.org".to_string(),
        }
    }

    #[test]
    fn test_author_markup() {
        assert_eq!(
            authors(&[jane()], &[String::new()]),
            concat!(
                "<author><persName><surname>Doe</surname><forename>Jane</forename></persName>",
                "<affiliation>Uni A &amp; B</affiliation><email>jane@example.org</email></author>"
            )
        );
    }

    #[test]
    fn test_author_with_orcid_and_empty_fields() {
        let anon = Author::default();
        let out = authors(
            &[jane(), anon],
            &["0000-0002-2771-9344".to_string(), String::new()],
        );
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(r#"<idno type="ORCID">0000-0002-2771-9344</idno></author>"#));
        assert_eq!(
            lines[1],
            concat!(
                "<author><persName><surname></surname><forename></forename></persName>",
                "<affiliation></affiliation><email></email></author>"
            )
        );
    }

    #[test]
    fn test_keywords() {
        let terms = vec!["TEI".to_string(), "XML & co".to_string()];
        assert_eq!(
            keywords("keywords", &terms, "ConfTool"),
            "<keywords n=\"keywords\" scheme=\"ConfTool\"><term>TEI</term>\n<term>XML &amp; co</term></keywords>"
        );
        assert_eq!(keywords("topics", &[], "ConfTool"), "");
    }

    #[test]
    fn test_titles() {
        assert_eq!(main_title("A <b>"), r#"<title type="main">A &lt;b&gt;</title>"#);
        assert_eq!(subtitle(""), "");
        assert_eq!(subtitle("Sub"), r#"<title type="sub">Sub</title>"#);
    }
}
