/*
 * math.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! LaTeX to MathML conversion.
//!
//! The conversion itself is done by a [`MathEngine`]. The [`MathAdapter`]
//! owns the engine, makes sure it was initialized before the renderer calls
//! it, and normalizes the engine output into a standalone `<math>` element
//! (named HTML entities are not defined in TEI, so they become numeric
//! references).

use std::io::Write;
use std::process::{Command, Stdio};

use async_trait::async_trait;
use tei_xml::escape_xml_text;

use crate::error::MathError;

const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";

/// Named entities some converters emit, with their numeric replacements.
const ENTITY_REPLACEMENTS: [(&str, &str); 5] = [
    ("&InvisibleTimes;", "&#8290;"),
    ("&ApplyFunction;", "&#x2061;"),
    ("&PlusMinus;", "&#177;"),
    ("&times;", "&#215;"),
    ("&x2061;", "&#x2061;"),
];

/// A LaTeX to MathML converter.
///
/// `latex_to_mathml` returns the *content* of a `<math>` element; a
/// surrounding `<math>` wrapper, if the engine emits one, is removed by the
/// adapter.
#[async_trait]
pub trait MathEngine: Send + Sync {
    fn name(&self) -> &str;

    /// One-time asynchronous setup. Called before the first conversion.
    async fn init(&mut self) -> Result<(), MathError> {
        Ok(())
    }

    fn latex_to_mathml(&self, latex: &str) -> Result<String, MathError>;
}

pub struct MathAdapter {
    engine: Box<dyn MathEngine>,
    ready: bool,
}

impl MathAdapter {
    pub fn new(engine: Box<dyn MathEngine>) -> Self {
        Self {
            engine,
            ready: false,
        }
    }

    pub async fn init(&mut self) -> Result<(), MathError> {
        if !self.ready {
            self.engine.init().await?;
            self.ready = true;
            tracing::debug!(engine = self.engine.name(), "math engine ready");
        }
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Convert a LaTeX formula to a `<math>` element.
    pub fn latex_to_mathml(&self, latex: &str) -> Result<String, MathError> {
        if !self.ready {
            return Err(MathError::NotInitialized);
        }
        let raw = self.engine.latex_to_mathml(latex)?;
        let inner = strip_math_wrapper(raw.trim());
        Ok(format!(
            "<math xmlns=\"{MATHML_NS}\">{}</math>",
            normalize_entities(inner)
        ))
    }
}

impl Default for MathAdapter {
    fn default() -> Self {
        Self::new(Box::new(TexAnnotationEngine))
    }
}

pub fn normalize_entities(mathml: &str) -> String {
    ENTITY_REPLACEMENTS
        .iter()
        .fold(mathml.to_string(), |acc, (from, to)| acc.replace(from, to))
}

fn strip_math_wrapper(mathml: &str) -> &str {
    if !mathml.starts_with("<math") || !mathml.ends_with("</math>") {
        return mathml;
    }
    match mathml.find('>') {
        Some(open_end) if !mathml[..open_end].ends_with('/') => {
            &mathml[open_end + 1..mathml.len() - "</math>".len()]
        }
        _ => mathml,
    }
}

// ============================================================================
// Built-in engines
// ============================================================================

/// Keeps the TeX source as an annotation instead of converting it.
///
/// Useful when no converter is available: the output is valid MathML and
/// downstream tools can recover the formula from the annotation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TexAnnotationEngine;

#[async_trait]
impl MathEngine for TexAnnotationEngine {
    fn name(&self) -> &str {
        "tex-annotation"
    }

    fn latex_to_mathml(&self, latex: &str) -> Result<String, MathError> {
        let tex = escape_xml_text(latex);
        Ok(format!(
            "<semantics><mtext>{tex}</mtext>\
             <annotation encoding=\"application/x-tex\">{tex}</annotation></semantics>"
        ))
    }
}

/// Runs an external converter, writing LaTeX to its stdin and reading
/// MathML from its stdout.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Parse `"prog --flag value"` into program and arguments (whitespace split).
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program).with_args(parts.collect()))
    }
}

#[async_trait]
impl MathEngine for CommandEngine {
    fn name(&self) -> &str {
        &self.program
    }

    /// Probe the converter once so a missing or broken binary fails the
    /// export before rendering starts.
    async fn init(&mut self) -> Result<(), MathError> {
        self.latex_to_mathml("x").map(|_| ())
    }

    fn latex_to_mathml(&self, latex: &str) -> Result<String, MathError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        // Feed stdin from its own thread while stdout is drained, so a
        // converter that writes before it finished reading cannot block us.
        let stdin = child.stdin.take();
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(latex.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            (output, written)
        });
        let output = output?;
        if !output.status.success() {
            return Err(MathError::Conversion {
                latex: latex.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;
        String::from_utf8(output.stdout).map_err(|e| MathError::Conversion {
            latex: latex.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEngine(&'static str);

    #[async_trait]
    impl MathEngine for FixedEngine {
        fn name(&self) -> &str {
            "fixed"
        }

        fn latex_to_mathml(&self, _latex: &str) -> Result<String, MathError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_requires_init() {
        let adapter = MathAdapter::default();
        assert!(!adapter.is_ready());
        assert!(matches!(
            adapter.latex_to_mathml("x"),
            Err(MathError::NotInitialized)
        ));
    }

    #[test]
    fn test_wraps_in_math_element() {
        let mut adapter = MathAdapter::new(Box::new(FixedEngine("<mi>x</mi>")));
        pollster::block_on(adapter.init()).unwrap();
        assert_eq!(
            adapter.latex_to_mathml("x").unwrap(),
            r#"<math xmlns="http://www.w3.org/1998/Math/MathML"><mi>x</mi></math>"#
        );
    }

    #[test]
    fn test_replaces_named_entities() {
        let mut adapter = MathAdapter::new(Box::new(FixedEngine(
            "<mi>a</mi><mo>&InvisibleTimes;</mo><mo>&PlusMinus;</mo><mo>&times;</mo>\
             <mo>&ApplyFunction;</mo><mo>&x2061;</mo>",
        )));
        pollster::block_on(adapter.init()).unwrap();
        let mathml = adapter.latex_to_mathml("").unwrap();
        assert!(mathml.contains("<mo>&#8290;</mo><mo>&#177;</mo><mo>&#215;</mo>"));
        assert!(mathml.contains("<mo>&#x2061;</mo><mo>&#x2061;</mo>"));
        assert!(!mathml.contains("&times;"));
    }

    #[test]
    fn test_strips_engine_math_wrapper() {
        let mut adapter = MathAdapter::new(Box::new(FixedEngine(
            "<math xmlns=\"http://www.w3.org/1998/Math/MathML\" display=\"block\"><mn>1</mn></math>\n",
        )));
        pollster::block_on(adapter.init()).unwrap();
        assert_eq!(
            adapter.latex_to_mathml("1").unwrap(),
            r#"<math xmlns="http://www.w3.org/1998/Math/MathML"><mn>1</mn></math>"#
        );
    }

    #[test]
    fn test_tex_annotation_escapes_source() {
        let mut adapter = MathAdapter::default();
        pollster::block_on(adapter.init()).unwrap();
        let mathml = adapter.latex_to_mathml(r"a < b \& c").unwrap();
        assert!(mathml.contains(r"<mtext>a &lt; b \&amp; c</mtext>"));
        assert!(mathml.contains(r#"<annotation encoding="application/x-tex">"#));
    }

    #[test]
    fn test_command_line_parsing() {
        let engine = CommandEngine::from_command_line("latexmlmath --quiet -").unwrap();
        assert_eq!(engine.name(), "latexmlmath");
        assert_eq!(engine.args, vec!["--quiet", "-"]);
        assert!(CommandEngine::from_command_line("   ").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_engine_pipes_stdin() {
        let mut adapter = MathAdapter::new(Box::new(CommandEngine::new("cat")));
        pollster::block_on(adapter.init()).unwrap();
        assert_eq!(
            adapter.latex_to_mathml("<mi>y</mi>").unwrap(),
            r#"<math xmlns="http://www.w3.org/1998/Math/MathML"><mi>y</mi></math>"#
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_command_engine_streams_large_output() {
        // Larger than a pipe buffer in both directions.
        let latex = "<mn>1</mn>".repeat(100_000);
        let engine = CommandEngine::new("cat");
        assert_eq!(engine.latex_to_mathml(&latex).unwrap(), latex);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_engine_failure() {
        let mut adapter = MathAdapter::new(Box::new(CommandEngine::new("false")));
        assert!(pollster::block_on(adapter.init()).is_err());
        assert!(!adapter.is_ready());
    }
}
