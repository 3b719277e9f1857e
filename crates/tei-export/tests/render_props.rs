/*
 * render_props.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Property tests for the rich-text renderer.
 */

use proptest::prelude::*;
use quick_xml::Reader;
use quick_xml::events::Event;
use tei_export::citations::CitationTexts;
use tei_export::render::{RenderContext, RenderOptions, RenderedText, render_rich_text, render_text};
use tei_export::{ImageDb, MathAdapter};
use tei_model::DocumentNode;
use tei_xml::escape_xml_text;

fn render(nodes: &[DocumentNode]) -> RenderedText {
    let images = ImageDb::default();
    let citations = CitationTexts::default();
    let mut math = MathAdapter::default();
    pollster::block_on(math.init()).unwrap();
    let options = RenderOptions::default();
    let ctx = RenderContext {
        images: &images,
        citations: &citations,
        math: &math,
        options: &options,
    };
    render_rich_text(nodes, &ctx).unwrap()
}

/// Element names in document order, `/name` for end tags.
fn element_events(xml: &str) -> Vec<String> {
    let wrapped = format!("<root>{xml}</root>");
    let mut reader = Reader::from_str(&wrapped);
    let mut out = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => out.push(String::from_utf8_lossy(e.name().as_ref()).into_owned()),
            Ok(Event::End(e)) => {
                out.push(format!("/{}", String::from_utf8_lossy(e.name().as_ref())))
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("not well-formed: {e}\n{xml}"),
        }
    }
    out
}

fn heading(level: u8, text: &str) -> DocumentNode {
    DocumentNode::new(format!("heading{level}")).with_content(vec![DocumentNode::text(text)])
}

fn footnote(n: usize) -> DocumentNode {
    DocumentNode::new("footnote").with_footnote(vec![
        DocumentNode::new("paragraph").with_content(vec![DocumentNode::text(format!("note {n}"))]),
    ])
}

proptest! {
    #[test]
    fn unmarked_text_renders_as_escaped_text(s in "\\PC*") {
        prop_assert_eq!(render_text(&DocumentNode::text(s.clone())), escape_xml_text(&s));
    }

    #[test]
    fn heading_sections_are_balanced(levels in prop::collection::vec(1u8..=6, 0..20)) {
        let nodes: Vec<_> = levels.iter().map(|&l| heading(l, "h")).collect();
        let out = render(&nodes);
        let events = element_events(&out.text);
        let opened = events.iter().filter(|e| *e == "div").count();
        let closed = events.iter().filter(|e| *e == "/div").count();
        prop_assert_eq!(opened, levels.len());
        prop_assert_eq!(closed, levels.len());
    }

    #[test]
    fn consecutive_levels_nest(depth in 1u8..=6) {
        let nodes: Vec<_> = (1..=depth).map(|l| heading(l, "h")).collect();
        let out = render(&nodes);
        let expected_tail = format!("<head>h</head>{}", "</div>".repeat(usize::from(depth)));
        prop_assert!(out.text.ends_with(&expected_tail));
        prop_assert!(!out.text.contains("</div><div"));
    }

    #[test]
    fn footnotes_numbered_globally_in_encounter_order(
        per_paragraph in prop::collection::vec(0usize..4, 0..8)
    ) {
        let mut counter = 0;
        let nodes: Vec<_> = per_paragraph
            .iter()
            .map(|&k| {
                let content = (0..k)
                    .map(|_| {
                        counter += 1;
                        footnote(counter)
                    })
                    .collect();
                DocumentNode::new("paragraph").with_content(content)
            })
            .collect();
        let out = render(&nodes);

        prop_assert_eq!(out.notes.len(), counter);
        for (i, note) in out.notes.iter().enumerate() {
            let n = i + 1;
            let expected_start = format!(r#"<note n="{n}" rend="footnote text" xml:id="ftn{n}">"#);
            let expected_body = format!("<p>note {n}</p>");
            prop_assert!(note.starts_with(&expected_start));
            prop_assert!(note.contains(&expected_body));
        }
        let refs: Vec<usize> = (1..=counter)
            .map(|n| out.text.find(&format!(r#"<ref n="{n}" target="ftn{n}" />"#)).unwrap())
            .collect();
        prop_assert!(refs.windows(2).all(|w| w[0] < w[1]));
    }
}
