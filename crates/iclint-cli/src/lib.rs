//! iclint CLI: walk a configuration tree, lint it, report.
//!
//! The core engine is deliberately pure (`lint(files) -> diagnostics`);
//! everything ambient lives here: argument parsing, `*.conf` discovery,
//! file reading, rendering, and the exit-code contract. Kept as a library
//! so the integration tests can drive [`run`] against a temp tree without
//! spawning the binary.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use iclint_core::{lint, ConfigFile, Diagnostic};

/// Static linter for Icinga 2 configuration trees.
#[derive(Debug, Parser)]
#[command(name = "iclint", version, about)]
pub struct Args {
    /// Root of the configuration tree, e.g. /etc/icinga2/conf.d
    pub path: PathBuf,

    /// Verbose debug logging on stderr
    #[arg(long)]
    pub debug: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One `path:line: ERROR message` line per finding, plus a summary.
    Text,
    /// The diagnostic list as a JSON array.
    Json,
}

/// Recursively collect `*.conf` files under `root`, sorted by path so the
/// lint pass (and its duplicate-name attribution) is reproducible.
pub fn find_config_files(root: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    // standard filters off: a linter must see everything the daemon would
    // load, gitignored or not
    let walk = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build();

    for entry in walk {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if entry.file_type().is_some_and(|t| t.is_file())
                    && path.extension().is_some_and(|e| e == "conf")
                {
                    paths.push(path.to_path_buf());
                }
            }
            Err(err) => tracing::warn!(%err, "skipping unreadable directory entry"),
        }
    }

    paths.sort();
    paths
}

/// Read the discovered files. An unreadable file is logged and skipped;
/// the rest of the tree is still linted.
pub fn load_files(paths: &[PathBuf]) -> Vec<ConfigFile> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match std::fs::read_to_string(path) {
            Ok(text) => files.push(ConfigFile::new(path.display().to_string(), text)),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "skipping unreadable file");
            }
        }
    }
    files
}

/// Lint the tree at `args.path` and write the report to `out`.
///
/// Returns the number of issues found; the caller turns that into the
/// process exit code.
pub fn run(args: &Args, out: &mut impl Write) -> Result<usize> {
    if !args.path.is_dir() {
        bail!("path not found: {}", args.path.display());
    }

    let paths = find_config_files(&args.path);
    tracing::debug!(files = paths.len(), root = %args.path.display(), "scanning configuration tree");

    let files = load_files(&paths);
    let diagnostics = lint(&files);
    render(&diagnostics, args.format, out).context("writing report")?;

    Ok(diagnostics.len())
}

fn render(diagnostics: &[Diagnostic], format: Format, out: &mut impl Write) -> Result<()> {
    match format {
        Format::Text => {
            for diag in diagnostics {
                writeln!(out, "{diag}")?;
            }
            if diagnostics.is_empty() {
                writeln!(out, "✅ No issues found.")?;
            } else {
                writeln!(out, "⚠️  {} issues found.", diagnostics.len())?;
            }
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, diagnostics)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
