/*
 * render/state.rs
 * Copyright (c) 2025 Posit, PBC
 */

/// Mutable traversal state for one renderer invocation.
///
/// Created fresh for each call to [`super::render_rich_text`] and threaded
/// through every recursive call by `&mut`; it never outlives the call.
#[derive(Debug, Default)]
pub struct RenderState {
    /// Levels of the currently open sections, outermost first.
    open_sections: Vec<u8>,
    pub footnote_count: usize,
    pub figure_count: usize,
    /// Number of citations rendered so far.
    pub citation_cursor: usize,
    /// Rendered `<note>` elements, in encounter order.
    pub footnotes: Vec<String>,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Heading level of the innermost open section, 0 when none is open.
    pub fn div_level(&self) -> u8 {
        self.open_sections.last().copied().unwrap_or(0)
    }

    pub fn open_section_count(&self) -> usize {
        self.open_sections.len()
    }

    /// Enter a section for a heading of `level`.
    ///
    /// Closes every open section at the same or a deeper level and returns
    /// how many were closed. For consecutive levels this is
    /// `div_level + 1 - level`; when levels were skipped only the sections
    /// actually open are closed.
    pub fn enter_section(&mut self, level: u8) -> usize {
        let mut closed = 0;
        while self.open_sections.last().is_some_and(|&open| open >= level) {
            self.open_sections.pop();
            closed += 1;
        }
        self.open_sections.push(level);
        closed
    }

    /// Close everything; returns the number of sections closed.
    pub fn close_all_sections(&mut self) -> usize {
        let n = self.open_sections.len();
        self.open_sections.clear();
        n
    }

    pub fn next_footnote(&mut self) -> usize {
        self.footnote_count += 1;
        self.footnote_count
    }

    pub fn next_figure(&mut self) -> usize {
        self.figure_count += 1;
        self.figure_count
    }
}
