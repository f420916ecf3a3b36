//! Replay recorded trace events through the trace engine.
//!
//! The binary is a thin wrapper around [`run`], so the same code path is
//! exercised by the integration tests.

pub mod cli;
pub mod recorder;

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use xslt_trace_core::{
    build_tree, render_tree, BuiltInRulePolicy, CanonicalEvent, DetailLevel, StylesheetSource,
    TraceConfig, TraceReport,
};

pub use cli::{Cli, Command};
pub use recorder::JsonLinesRecorder;

/// Initialize tracing; `RUST_LOG` wins over the built-in default
pub fn init_tracing(verbose: bool) {
    let default = if verbose {
        "xslt_trace_core=debug,xslt_trace_cli=debug"
    } else {
        "xslt_trace_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Configuration file values with command-line overrides applied
pub fn load_config(cli: &Cli) -> Result<TraceConfig> {
    let mut config = match &cli.config {
        Some(path) => TraceConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TraceConfig::default(),
    };
    if let Some(detail) = cli.detail {
        config.detail_level = DetailLevel::try_from(detail)?;
    }
    if cli.include_built_in {
        config.built_in_rules = BuiltInRulePolicy::Emit;
    }
    Ok(config)
}

/// Read a JSON array of canonical events
pub fn load_events(path: &Path) -> Result<Vec<CanonicalEvent>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read events {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse events {}", path.display()))
}

fn load_source(path: &Path) -> Result<StylesheetSource> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(StylesheetSource::new(name, text))
}

/// Execute one command, writing its result to `out`
pub fn run<W: Write + ?Sized>(cli: &Cli, out: &mut W) -> Result<()> {
    let config = load_config(cli)?;

    match &cli.command {
        Command::Render {
            events,
            no_separator,
        } => {
            let tree = build_tree(config.detail_level, load_events(events)?)?;
            info!(nodes = tree.node_count(), "trace rebuilt");
            let text = render_tree(&tree, config.show_separator && !no_separator);
            out.write_all(text.as_bytes())?;
        }
        Command::Report {
            events,
            xml,
            xsl,
            imports,
            output,
            correlation_id,
        } => {
            let tree = build_tree(config.detail_level, load_events(events)?)?;
            let result = match output {
                Some(path) => fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => String::new(),
            };
            let mut report = TraceReport::new(&tree, load_source(xml)?, load_source(xsl)?, result);
            for import in imports {
                report = report.with_import(load_source(import)?);
            }

            let mut recorder = JsonLinesRecorder::new(&mut *out);
            let summary = report
                .emit(correlation_id, &config, &mut recorder)
                .context("Failed to emit trace report")?;
            info!(
                checkpoints = recorder.written(),
                skipped_built_in = summary.skipped_built_in,
                "report written"
            );
        }
    }
    Ok(())
}
