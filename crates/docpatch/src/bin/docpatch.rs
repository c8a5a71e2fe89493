//! `docpatch` - apply path-addressed patches to JSON documents.
//!
//! Usage:
//!   docpatch [--doc FILE] apply '<patch-json>'
//!   docpatch [--doc FILE] apply --patch-file FILE
//!   docpatch [--doc FILE] resolve 'tags[_key=="x"].v'
//!
//! The document is read from `--doc` or stdin. Logging goes to stderr and is
//! controlled with `RUST_LOG`.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docpatch::cli::{apply_document_patch, render, resolve_document_path, OutputStyle};
use docpatch::{ApplyOptions, DEFAULT_IDENTITY_FIELD};

#[derive(Parser, Debug)]
#[command(name = "docpatch", version, about = "Apply path-addressed patches to JSON documents")]
struct Cli {
    /// Document to read instead of stdin.
    #[arg(long, global = true, value_name = "FILE")]
    doc: Option<PathBuf>,

    /// Field that keyed selectors match array elements on.
    #[arg(long, global = true, default_value = DEFAULT_IDENTITY_FIELD)]
    identity_field: String,

    /// Print single-line JSON.
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a patch event (or bare operation array) and print the result.
    Apply {
        /// Patch as inline JSON.
        patch: Option<String>,

        /// Read the patch from a file.
        #[arg(long, value_name = "FILE", conflicts_with = "patch")]
        patch_file: Option<PathBuf>,
    },
    /// Print the value at a textual path.
    Resolve {
        path: String,
    },
}

fn read_document(doc: Option<&PathBuf>) -> Result<String> {
    match doc {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read document {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read document from stdin")?;
            Ok(buf)
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let options = ApplyOptions {
        identity_field: cli.identity_field.clone(),
    };
    let style = if cli.compact {
        OutputStyle::Compact
    } else {
        OutputStyle::Pretty
    };

    let output = match &cli.command {
        Command::Apply { patch, patch_file } => {
            let patch = match (patch, patch_file) {
                (Some(p), _) => p.clone(),
                (None, Some(path)) => fs::read_to_string(path)
                    .with_context(|| format!("failed to read patch {}", path.display()))?,
                (None, None) => bail!("a patch is required: pass it inline or with --patch-file"),
            };
            let doc = read_document(cli.doc.as_ref())?;
            let patched = apply_document_patch(doc.trim(), &patch, &options)?;
            render(&patched, style)?
        }
        Command::Resolve { path } => {
            let doc = read_document(cli.doc.as_ref())?;
            let value = resolve_document_path(doc.trim(), path, &options)?;
            render(&value, style)?
        }
    };

    println!("{output}");
    Ok(())
}
