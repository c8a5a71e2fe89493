//! Core logic behind the `docpatch` binary.
//!
//! The binary only handles argument parsing and I/O; everything that can be
//! tested without a terminal lives here.

use serde_json::Value;
use thiserror::Error;

use crate::apply::apply_with;
use crate::codec::json::event_from_json;
use crate::types::{ApplyError, ApplyOptions, PatchError, PathAddress, PathError};
use docpatch_path::resolve_with;

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CliError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Decode(#[from] PatchError),
    #[error("{0}")]
    Apply(#[from] ApplyError),
    #[error("{0}")]
    Path(#[from] PathError),
    #[error("nothing at `{0}`")]
    NotFound(PathAddress),
}

/// Output formatting for rendered documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputStyle {
    #[default]
    Pretty,
    Compact,
}

pub fn render(value: &Value, style: OutputStyle) -> Result<String, CliError> {
    let text = match style {
        OutputStyle::Pretty => serde_json::to_string_pretty(value)?,
        OutputStyle::Compact => serde_json::to_string(value)?,
    };
    Ok(text)
}

// ── apply ─────────────────────────────────────────────────────────────────

/// Apply a patch to a document.
///
/// `doc_json`: the document as a JSON string.
/// `patch_json`: an event object or a bare array of operations.
///
/// Returns the patched document.
pub fn apply_document_patch(
    doc_json: &str,
    patch_json: &str,
    options: &ApplyOptions,
) -> Result<Value, CliError> {
    let doc: Value = serde_json::from_str(doc_json)?;
    let raw: Value = serde_json::from_str(patch_json)?;
    let event = event_from_json(&raw)?;
    Ok(apply_with(&doc, &event, options)?)
}

// ── resolve ───────────────────────────────────────────────────────────────

/// Look up a textual path (`tags[_key=="x"].v`) in a document.
///
/// An absent location is reported as [`CliError::NotFound`].
pub fn resolve_document_path(
    doc_json: &str,
    path: &str,
    options: &ApplyOptions,
) -> Result<Value, CliError> {
    let doc: Value = serde_json::from_str(doc_json)?;
    let path: PathAddress = path.parse()?;
    match resolve_with(&doc, &path, &options.identity_field)? {
        Some(v) => Ok(v.clone()),
        None => Err(CliError::NotFound(path)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
