//! Core types: operations, errors and apply options.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

pub use docpatch_path::{PathAddress, PathError, PathSegment, DEFAULT_IDENTITY_FIELD};

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    /// A value along the path, or the operation's target, has the wrong shape.
    #[error("type mismatch at `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        path: PathAddress,
        expected: &'static str,
        found: &'static str,
    },
    /// An ancestor the operation needs does not exist.
    #[error("missing parent for `{path}`")]
    MissingParent { path: PathAddress },
    /// Malformed wire input.
    #[error("invalid operation: {0}")]
    InvalidOp(String),
}

impl PatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PatchError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            PatchError::MissingParent { .. } => ErrorKind::MissingParent,
            PatchError::InvalidOp(_) => ErrorKind::InvalidOp,
        }
    }

    pub(crate) fn missing_parent(path: &PathAddress) -> Self {
        PatchError::MissingParent { path: path.clone() }
    }
}

impl From<PathError> for PatchError {
    fn from(e: PathError) -> Self {
        match e {
            PathError::TypeMismatch {
                path,
                expected,
                found,
            } => PatchError::TypeMismatch {
                path,
                expected,
                found,
            },
            other => PatchError::InvalidOp(other.to_string()),
        }
    }
}

/// Error taxonomy surfaced to callers that only need to branch on the class
/// of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TypeMismatch,
    MissingParent,
    InvalidOp,
}

/// Failure of a whole event: which operation failed, and why.
///
/// No partial document accompanies this error; the event is all-or-nothing.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("operation {index} failed: {error}")]
pub struct ApplyError {
    /// Position of the failing operation within the event.
    pub index: usize,
    #[source]
    pub error: PatchError,
}

impl ApplyError {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

// ── Insert payload ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Before,
    After,
    Replace,
}

impl InsertPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsertPosition::Before => "before",
            InsertPosition::After => "after",
            InsertPosition::Replace => "replace",
        }
    }

    pub fn from_name(s: &str) -> Result<Self, PatchError> {
        match s {
            "before" => Ok(InsertPosition::Before),
            "after" => Ok(InsertPosition::After),
            "replace" => Ok(InsertPosition::Replace),
            other => Err(PatchError::InvalidOp(format!("unknown insert position: {other}"))),
        }
    }
}

/// The array element an insert is positioned against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRef {
    Index(usize),
    Keyed(String),
}

impl ItemRef {
    pub fn to_segment(&self) -> PathSegment {
        match self {
            ItemRef::Index(i) => PathSegment::Index(*i),
            ItemRef::Keyed(id) => PathSegment::Keyed(id.clone()),
        }
    }
}

impl TryFrom<PathSegment> for ItemRef {
    type Error = PatchError;

    fn try_from(segment: PathSegment) -> Result<Self, Self::Error> {
        match segment {
            PathSegment::Index(i) => Ok(ItemRef::Index(i)),
            PathSegment::Keyed(id) => Ok(ItemRef::Keyed(id)),
            PathSegment::Key(k) => Err(PatchError::InvalidOp(format!(
                "insert reference must be an index or keyed selector, got key `{k}`"
            ))),
        }
    }
}

impl From<usize> for ItemRef {
    fn from(i: usize) -> Self {
        ItemRef::Index(i)
    }
}

// ── Operation ─────────────────────────────────────────────────────────────

/// A single path-addressed mutation.
///
/// Operations are plain values, independent of any document; whether their
/// paths resolve is only checked when they are applied.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOperation {
    /// Replace the value at `path`. The parent must exist.
    Set { path: PathAddress, value: Value },
    /// Set `value` only if nothing (or `null`) is at `path`. Missing
    /// intermediate object keys are created.
    SetIfMissing { path: PathAddress, value: Value },
    /// Remove the value at `path`; no-op when already absent.
    ///
    /// Repeating an unset is a no-op for key and keyed paths. An index path
    /// names a position, so a second `unset(list[0])` removes the element
    /// that shifted into slot 0. Unsetting the root leaves `null`, where
    /// unsetting a field removes its key.
    Unset { path: PathAddress },
    /// Splice `items` into the array at `path`, relative to `reference`.
    Insert {
        path: PathAddress,
        position: InsertPosition,
        reference: ItemRef,
        items: Vec<Value>,
    },
    Inc { path: PathAddress, amount: f64 },
    Dec { path: PathAddress, amount: f64 },
}

impl PatchOperation {
    /// Wire name of the operation.
    pub fn op_name(&self) -> &'static str {
        match self {
            PatchOperation::Set { .. } => "set",
            PatchOperation::SetIfMissing { .. } => "setIfMissing",
            PatchOperation::Unset { .. } => "unset",
            PatchOperation::Insert { .. } => "insert",
            PatchOperation::Inc { .. } => "inc",
            PatchOperation::Dec { .. } => "dec",
        }
    }

    pub fn path(&self) -> &PathAddress {
        match self {
            PatchOperation::Set { path, .. }
            | PatchOperation::SetIfMissing { path, .. }
            | PatchOperation::Unset { path }
            | PatchOperation::Insert { path, .. }
            | PatchOperation::Inc { path, .. }
            | PatchOperation::Dec { path, .. } => path,
        }
    }

    /// The same operation, retargeted at `new_path`.
    pub fn with_path(mut self, new_path: PathAddress) -> Self {
        match &mut self {
            PatchOperation::Set { path, .. }
            | PatchOperation::SetIfMissing { path, .. }
            | PatchOperation::Unset { path }
            | PatchOperation::Insert { path, .. }
            | PatchOperation::Inc { path, .. }
            | PatchOperation::Dec { path, .. } => *path = new_path,
        }
        self
    }
}

// ── Constructors ──────────────────────────────────────────────────────────

pub fn set(path: impl Into<PathAddress>, value: Value) -> PatchOperation {
    PatchOperation::Set {
        path: path.into(),
        value,
    }
}

pub fn set_if_missing(path: impl Into<PathAddress>, value: Value) -> PatchOperation {
    PatchOperation::SetIfMissing {
        path: path.into(),
        value,
    }
}

pub fn unset(path: impl Into<PathAddress>) -> PatchOperation {
    PatchOperation::Unset { path: path.into() }
}

pub fn insert(
    path: impl Into<PathAddress>,
    position: InsertPosition,
    reference: impl Into<ItemRef>,
    items: Vec<Value>,
) -> PatchOperation {
    PatchOperation::Insert {
        path: path.into(),
        position,
        reference: reference.into(),
        items,
    }
}

pub fn inc(path: impl Into<PathAddress>, amount: impl Into<f64>) -> PatchOperation {
    PatchOperation::Inc {
        path: path.into(),
        amount: amount.into(),
    }
}

pub fn dec(path: impl Into<PathAddress>, amount: impl Into<f64>) -> PatchOperation {
    PatchOperation::Dec {
        path: path.into(),
        amount: amount.into(),
    }
}

// ── Event metadata and options ────────────────────────────────────────────

/// Who produced an event, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOrigin {
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

impl PatchOrigin {
    /// Origin stamped with the current time.
    pub fn now(source: impl Into<String>) -> Self {
        Self::at(source, Utc::now())
    }

    pub fn at(source: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            source: source.into(),
            timestamp,
        }
    }
}

/// Options for [`apply_with`](crate::apply::apply_with).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Field keyed selectors match array elements on.
    pub identity_field: String,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
        }
    }
}
