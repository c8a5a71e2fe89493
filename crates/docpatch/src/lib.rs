//! Path-addressed patches for nested JSON documents.
//!
//! A [`PatchEvent`] is an ordered batch of [`PatchOperation`]s produced by
//! one edit. Operations address their target with a [`PathAddress`], whose
//! segments are object keys, array indices, or keyed selectors that follow
//! an array element by its `_key` rather than its position.
//!
//! Applying an event is all-or-nothing: operations run in order against the
//! document produced by the ones before them, and the first failure aborts
//! the event with an [`ApplyError`] and no partial result.
//!
//! # Example
//!
//! ```
//! use docpatch::{apply, inc, set, PatchEvent, PathAddress};
//! use serde_json::json;
//!
//! let doc = json!({"title": "A", "tags": [{"_key": "x", "count": 1}]});
//! let event = PatchEvent::from(vec![
//!     set(PathAddress::root().key("title"), json!("B")),
//!     inc(PathAddress::root().key("tags").keyed("x").key("count"), 2.0),
//! ]);
//!
//! let patched = apply(&doc, &event).unwrap();
//! assert_eq!(patched, json!({"title": "B", "tags": [{"_key": "x", "count": 3}]}));
//! assert_eq!(doc["title"], "A");
//! ```

pub mod apply;
pub mod cli;
pub mod codec;
pub mod event;
pub mod types;
pub mod util;

pub use apply::{apply, apply_op, apply_with};
pub use event::PatchEvent;
pub use types::{
    dec, inc, insert, set, set_if_missing, unset, ApplyError, ApplyOptions, ErrorKind,
    InsertPosition, ItemRef, PatchError, PatchOperation, PatchOrigin, PathAddress, PathError,
    PathSegment, DEFAULT_IDENTITY_FIELD,
};
