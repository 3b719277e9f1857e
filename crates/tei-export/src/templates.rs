/*
 * templates.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Fixed TEI document skeleton.
//!
//! Pure string composition: every argument is a finished, escaped markup
//! fragment and is inserted verbatim.

pub const TEI_NS: &str = "http://www.tei-c.org/ns/1.0";

const APPLICATION_IDENT: &str = "tei-export";
const APPLICATION_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fragments that make up `<teiHeader>`.
#[derive(Debug, Clone, Default)]
pub struct HeaderFragments<'a> {
    /// `<title type="main">`
    pub title: &'a str,
    /// `<title type="sub">`, may be empty
    pub subtitle: &'a str,
    /// `<author>` elements
    pub authors: &'a str,
    /// Edition date, `YYYY-MM-DD`
    pub date: &'a str,
    pub publication_statement: &'a str,
    pub source_description: &'a str,
    /// Rendered abstract content, may be empty
    pub abstract_text: &'a str,
    /// `<keywords>` classes
    pub keywords: &'a str,
}

pub fn tei_header(h: &HeaderFragments<'_>) -> String {
    let abstract_block = if h.abstract_text.is_empty() {
        String::new()
    } else {
        format!("<abstract>{}</abstract>", h.abstract_text)
    };
    format!(
        r#"<teiHeader>
    <fileDesc>
        <titleStmt>
            {title}
            {subtitle}
            {authors}
        </titleStmt>
        <editionStmt>
            <edition>
                <date>{date}</date>
            </edition>
        </editionStmt>
        <publicationStmt>
            <publisher>{publication}</publisher>
        </publicationStmt>
        <sourceDesc>
            <p>{source}</p>
        </sourceDesc>
    </fileDesc>
    <encodingDesc>
        <appInfo>
            <application ident="{APPLICATION_IDENT}" version="{APPLICATION_VERSION}">
                <label>TEI exporter</label>
            </application>
        </appInfo>
    </encodingDesc>
    <profileDesc>
        {abstract_block}
        <textClass>
            {keywords}
        </textClass>
    </profileDesc>
    <revisionDesc>
        <change when="{date}">exported to TEI</change>
    </revisionDesc>
</teiHeader>"#,
        title = h.title,
        subtitle = h.subtitle,
        authors = h.authors,
        date = h.date,
        publication = h.publication_statement,
        source = h.source_description,
        keywords = h.keywords,
    )
}

/// `<back>`: the notes div (may be empty) and the bibliography list.
pub fn tei_back(notes: &str, bibliography_head: &str, bibliography_items: &str) -> String {
    format!(
        r#"<back>
    {notes}
    <div type="bibliogr">
        <listBibl>
            <head>{bibliography_head}</head>
            {bibliography_items}
        </listBibl>
    </div>
</back>"#
    )
}

pub fn tei_document(slug: &str, header: &str, body: &str, back: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<TEI xml:id="{slug}" xmlns="{TEI_NS}">
{header}
<text>
    <body>{body}</body>
    {back}
</text>
</TEI>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_root() {
        let doc = tei_document("my-doc", "<teiHeader/>", "<p>x</p>", "<back/>");
        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(doc.contains(r#"<TEI xml:id="my-doc" xmlns="http://www.tei-c.org/ns/1.0">"#));
        assert!(doc.contains("<text>\n    <body><p>x</p></body>\n    <back/>\n</text>"));
        assert!(doc.ends_with("</TEI>\n"));
    }

    #[test]
    fn test_header_without_abstract() {
        let header = tei_header(&HeaderFragments {
            title: r#"<title type="main">T</title>"#,
            date: "2024-01-31",
            publication_statement: "DHd",
            source_description: "Born digital",
            ..Default::default()
        });
        assert!(!header.contains("<abstract>"));
        assert!(header.contains("<date>2024-01-31</date>"));
        assert!(header.contains(r#"<change when="2024-01-31">"#));
        assert!(header.contains("<publisher>DHd</publisher>"));
        assert!(header.contains("<p>Born digital</p>"));
    }

    #[test]
    fn test_header_with_abstract() {
        let header = tei_header(&HeaderFragments {
            abstract_text: "<p>Short.</p>",
            ..Default::default()
        });
        assert!(header.contains("<profileDesc>\n        <abstract><p>Short.</p></abstract>"));
    }

    #[test]
    fn test_back() {
        let back = tei_back("", "Bibliography", "<bibl>A</bibl>");
        assert!(back.contains("<head>Bibliography</head>\n            <bibl>A</bibl>"));
    }
}
