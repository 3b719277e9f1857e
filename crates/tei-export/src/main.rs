/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! tei-export CLI - Main entry point

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tei_export::{
    CommandEngine, ExportConfig, ExportDocument, ExportError, ImageDb, PrecomputedCitations,
    TeiExporter, WordLimit,
};
use tei_model::BibDb;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tei-export")]
#[command(version)]
#[command(about = "Export a rich-text document to TEI XML", long_about = None)]
struct Cli {
    /// Document JSON (a `doc` node, or {title, content, settings})
    input: PathBuf,

    /// Write SLUG.tei.xml to DIR
    #[arg(short = 'o', long, default_value = ".")]
    output_dir: PathBuf,

    /// Image database JSON ({"db": {ID: {"image": PATH}}})
    #[arg(long)]
    images: Option<PathBuf>,

    /// Precomputed citation texts and bibliography JSON
    #[arg(long)]
    citations: Option<PathBuf>,

    /// Bibliography database JSON, used by the structured bibliography mode
    #[arg(long)]
    bibliography: Option<PathBuf>,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of words in the abstract (-1 disables the check)
    #[arg(long, allow_hyphen_values = true)]
    max_abstract_words: Option<i64>,

    /// External LaTeX to MathML converter (reads stdin, writes stdout)
    #[arg(long)]
    math_command: Option<String>,

    /// Edition date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<String>,

    /// Write the TEI document to stdout instead of a file
    #[arg(long)]
    stdout: bool,

    /// Only log warnings and errors
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.quiet {
        "tei_export=warn"
    } else {
        "tei_export=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExportError>() {
            Some(export_err) if export_err.is_check_failure() => {
                tracing::warn!("{export_err}");
                ExitCode::from(2)
            }
            _ => {
                tracing::error!("export failed: {err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn load_config(cli: &Cli) -> Result<ExportConfig> {
    let mut config = match &cli.config {
        Some(path) => ExportConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ExportConfig::default(),
    };
    if let Some(n) = cli.max_abstract_words {
        config = config.with_abstract_word_limit(WordLimit::try_from(n).map_err(|e| anyhow!(e))?);
    }
    if let Some(date) = &cli.date {
        config = config.with_date(date.clone());
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let doc = ExportDocument::from_file(&cli.input)
        .with_context(|| format!("reading document {}", cli.input.display()))?;

    let mut exporter = TeiExporter::new(config);
    if let Some(path) = &cli.images {
        let images = ImageDb::from_file(path)
            .with_context(|| format!("reading image database {}", path.display()))?;
        exporter = exporter.with_images(images);
    }
    if let Some(path) = &cli.citations {
        let citations = PrecomputedCitations::from_file(path)
            .with_context(|| format!("reading citations {}", path.display()))?;
        exporter = exporter.with_citation_processor(citations);
    }
    if let Some(path) = &cli.bibliography {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading bibliography {}", path.display()))?;
        let db: BibDb = serde_json::from_str(&json)
            .with_context(|| format!("parsing bibliography {}", path.display()))?;
        exporter = exporter.with_bibliography(db);
    }
    if let Some(command) = &cli.math_command {
        let engine = CommandEngine::from_command_line(command)
            .ok_or_else(|| anyhow!("empty math command"))?;
        exporter = exporter.with_math_engine(engine);
    }

    // Keep ExportError intact so main can tell check failures apart.
    let output = pollster::block_on(exporter.export(&doc)).map_err(anyhow::Error::new)?;

    if cli.stdout {
        std::io::stdout().write_all(&output.tei)?;
        return Ok(());
    }
    let path = output
        .write_to_dir(&cli.output_dir)
        .with_context(|| format!("writing to {}", cli.output_dir.display()))?;
    tracing::info!(path = %path.display(), "wrote TEI document");
    println!("{}", serde_json::to_string_pretty(&output.images)?);
    Ok(())
}
