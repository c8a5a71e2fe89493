//! Path addresses for nested document trees.
//!
//! A [`PathAddress`] is an ordered list of [`PathSegment`]s: object keys,
//! array indices, and keyed selectors that pick an array element by its
//! identity field (`_key`) instead of its position.
//!
//! # Example
//!
//! ```
//! use docpatch_path::{parse_path, resolve, PathAddress, PathError};
//! use serde_json::json;
//!
//! let doc = json!({"title": "A", "tags": [{"_key": "x", "v": 1}]});
//!
//! let path: PathAddress = r#"tags[_key=="x"].v"#.parse().unwrap();
//! assert_eq!(resolve(&doc, &path).unwrap(), Some(&json!(1)));
//!
//! // Missing locations are absent, not errors.
//! assert_eq!(resolve(&doc, &parse_path("missing.field").unwrap()).unwrap(), None);
//!
//! // Stepping into a value of the wrong shape is.
//! let err = resolve(&doc, &parse_path("tags.x").unwrap()).unwrap_err();
//! assert!(matches!(err, PathError::TypeMismatch { .. }));
//! ```

use std::str::FromStr;

use thiserror::Error;

pub mod get;
pub mod json;
pub mod types;
pub mod util;
pub mod validate;

pub use get::{locate_index, resolve, resolve_mut, resolve_with, type_name};
pub use json::{path_from_json, path_to_json, segment_from_json, segment_to_json};
pub use types::{PathAddress, PathSegment, DEFAULT_IDENTITY_FIELD};
pub use util::{format_path, parse_path};
pub use validate::{validate_path, MAX_PATH_LENGTH};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A value along the path has the wrong shape for the next segment.
    #[error("type mismatch at `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        /// Location of the offending value.
        path: PathAddress,
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("path too long")]
    PathTooLong,
}

impl FromStr for PathAddress {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path(s)
    }
}
