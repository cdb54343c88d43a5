//! Backfill CLI
//!
//! File-level shell around `backfill-core`: reads rule files and sources,
//! runs the rewrite, and writes results back. All text surgery lives in
//! the core crate; this crate only owns I/O, reporting and logging setup.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

use anyhow::{Context, Result};
use backfill_core::{Delimiters, LineIndex, Locator, RewriteReport, RuleFile};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// What to do with a rewritten file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Write changes back in place
    Write,
    /// Report only; nothing is written
    Check,
    /// Return the rewritten text for printing
    Print,
}

/// Result of processing one file
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub changed: bool,
    pub report: RewriteReport,
    /// Rewritten text, kept only in [`Mode::Print`]
    #[serde(skip)]
    pub output: Option<String>,
}

/// One located invocation, for the `locate` subcommand
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpanLine {
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` when verbose.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // already installed by an embedding binary or test harness
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

/// Read and validate a TOML rule file
///
/// # Errors
/// Fails if the file cannot be read or its rule sets are invalid
pub fn load_rules(path: &Path) -> Result<RuleFile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading rule file {}", path.display()))?;
    RuleFile::from_toml(&text).with_context(|| format!("loading rules from {}", path.display()))
}

/// Rewrite one source file according to `mode`
///
/// # Errors
/// Fails on I/O errors or when the file holds an unbalanced invocation;
/// the file is never partially written
pub fn process_file(path: &Path, rules: &RuleFile, mode: Mode) -> Result<FileOutcome> {
    let source =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let (output, report) = rules
        .apply(&source)
        .with_context(|| format!("rewriting {}", path.display()))?;
    let changed = output != source;

    for skipped in &report.skipped {
        tracing::warn!(
            file = %path.display(),
            key = %skipped.required_key,
            anchor = %skipped.anchor_key,
            "anchor missing, argument not added"
        );
    }

    match mode {
        Mode::Write if changed => {
            fs::write(path, &output).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(
                file = %path.display(),
                insertions = report.insertions.len(),
                invocations = report.invocations_changed(),
                "fixed"
            );
        }
        Mode::Check if changed => {
            tracing::info!(file = %path.display(), "would change");
        }
        _ => tracing::debug!(file = %path.display(), changed, "processed"),
    }

    Ok(FileOutcome {
        path: path.to_path_buf(),
        changed,
        report,
        output: (mode == Mode::Print).then_some(output),
    })
}

/// List invocations of `construct` in a buffer with line/column positions
///
/// # Errors
/// Fails when an invocation never closes
pub fn describe_spans(
    buffer: &str,
    construct: &str,
    delimiters: Delimiters,
) -> Result<Vec<SpanLine>> {
    let locator = Locator::with_delimiters(construct, delimiters);
    let index = LineIndex::new(buffer);
    let spans = locator.locate_all(buffer)?;
    Ok(spans
        .into_iter()
        .map(|span| {
            let (line, column) = index.position(span.construct_start);
            let full = &buffer[span.full()];
            let text = full.lines().next().unwrap_or_default().to_string();
            SpanLine {
                line,
                column,
                start: span.construct_start,
                end: span.args_end + 1,
                text,
            }
        })
        .collect())
}

/// Render outcomes as a JSON array
///
/// # Errors
/// Fails only if serialization fails
pub fn outcomes_json(outcomes: &[FileOutcome]) -> Result<String> {
    serde_json::to_string_pretty(outcomes).context("serializing report")
}
