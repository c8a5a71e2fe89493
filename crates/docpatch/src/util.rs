//! Helpers for narrowing patches to a subtree.

use crate::types::{PatchOperation, PathAddress};

// ── Path matcher ───────────────────────────────────────────────────────────

/// Creates a closure that returns `true` if an operation's path starts with
/// `prefix`.
///
/// An operation matches when its path equals the prefix or lies below it.
/// Pair it with [`PatchEvent::filter`](crate::PatchEvent::filter) to pick the
/// part of an event that concerns one field.
///
/// # Example
///
/// ```
/// use docpatch::{set, util::matcher, PatchEvent, PathAddress};
/// use serde_json::json;
///
/// let title = PathAddress::root().key("title");
/// let is_title = matcher(&title);
///
/// let event = PatchEvent::from(vec![
///     set(PathAddress::root().key("title"), json!("B")),
///     set(PathAddress::root().key("slug"), json!("b")),
/// ]);
/// assert_eq!(event.filter(&is_title).len(), 1);
/// ```
pub fn matcher(prefix: &PathAddress) -> impl Fn(&PatchOperation) -> bool + '_ {
    move |op: &PatchOperation| op.path().starts_with(prefix)
}

// ── Tests ─────────────────────────────────────────────────────────────────
