//! Patch events: ordered batches of operations with one edit intent.

use serde_json::Value;

use crate::apply::apply;
use crate::types::{ApplyError, PatchOperation, PatchOrigin, PathAddress};

/// An ordered list of operations, plus optional origin metadata.
///
/// Events are built by a producer, optionally combined with other events,
/// and then applied once. Every combinator returns a new event.
///
/// # Example
///
/// ```
/// use docpatch::{set, set_if_missing, PatchEvent, PathAddress};
/// use serde_json::json;
///
/// let field = PathAddress::root().key("author");
/// let local = PatchEvent::from(vec![
///     set_if_missing(PathAddress::root(), json!({"_type": "reference"})),
///     set(PathAddress::root().key("_ref"), json!("person-1")),
/// ]);
///
/// // Relocate the field-local patch into document coordinates.
/// let event = local.prefix_all(&field);
/// let doc = event.apply(&json!({"title": "A"})).unwrap();
/// assert_eq!(doc, json!({"title": "A", "author": {"_type": "reference", "_ref": "person-1"}}));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchEvent {
    operations: Vec<PatchOperation>,
    origin: Option<PatchOrigin>,
}

impl PatchEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_origin(mut self, origin: PatchOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn operations(&self) -> &[PatchOperation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<PatchOperation> {
        self.operations
    }

    pub fn origin(&self) -> Option<&PatchOrigin> {
        self.origin.as_ref()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatchOperation> {
        self.operations.iter()
    }

    /// Concatenate two events, `self` first. The origin of `self` wins when
    /// both carry one.
    pub fn combine(&self, other: &PatchEvent) -> PatchEvent {
        let mut operations = Vec::with_capacity(self.len() + other.len());
        operations.extend_from_slice(&self.operations);
        operations.extend_from_slice(&other.operations);
        PatchEvent {
            operations,
            origin: self.origin.clone().or_else(|| other.origin.clone()),
        }
    }

    /// Move every operation under `prefix`.
    pub fn prefix_all(&self, prefix: &PathAddress) -> PatchEvent {
        self.map_operations(|op| {
            let path = prefix.append(op.path());
            Some(op.clone().with_path(path))
        })
    }

    /// Keep the operations under `prefix`, re-rooted at it. Inverse of
    /// [`prefix_all`](Self::prefix_all).
    pub fn focus(&self, prefix: &PathAddress) -> PatchEvent {
        self.map_operations(|op| {
            let path = op.path().strip_prefix(prefix)?;
            Some(op.clone().with_path(path))
        })
    }

    pub fn filter(&self, pred: impl Fn(&PatchOperation) -> bool) -> PatchEvent {
        self.map_operations(|op| pred(op).then(|| op.clone()))
    }

    pub fn prepend(mut self, ops: impl IntoIterator<Item = PatchOperation>) -> Self {
        let mut operations: Vec<PatchOperation> = ops.into_iter().collect();
        operations.append(&mut self.operations);
        self.operations = operations;
        self
    }

    pub fn append(mut self, ops: impl IntoIterator<Item = PatchOperation>) -> Self {
        self.operations.extend(ops);
        self
    }

    /// Apply this event with default options. See [`apply`].
    pub fn apply(&self, doc: &Value) -> Result<Value, ApplyError> {
        apply(doc, self)
    }

    fn map_operations(&self, f: impl Fn(&PatchOperation) -> Option<PatchOperation>) -> PatchEvent {
        PatchEvent {
            operations: self.operations.iter().filter_map(f).collect(),
            origin: self.origin.clone(),
        }
    }
}

impl From<Vec<PatchOperation>> for PatchEvent {
    fn from(operations: Vec<PatchOperation>) -> Self {
        PatchEvent {
            operations,
            origin: None,
        }
    }
}

impl From<PatchOperation> for PatchEvent {
    fn from(op: PatchOperation) -> Self {
        PatchEvent::from(vec![op])
    }
}

impl FromIterator<PatchOperation> for PatchEvent {
    fn from_iter<I: IntoIterator<Item = PatchOperation>>(iter: I) -> Self {
        PatchEvent::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a> IntoIterator for &'a PatchEvent {
    type Item = &'a PatchOperation;
    type IntoIter = std::slice::Iter<'a, PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

impl IntoIterator for PatchEvent {
    type Item = PatchOperation;
    type IntoIter = std::vec::IntoIter<PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{inc, set, unset};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn p(text: &str) -> PathAddress {
        text.parse().unwrap()
    }

    #[test]
    fn from_preserves_order() {
        let a = set(p("a"), json!(1));
        let b = unset(p("b"));
        let event = PatchEvent::from(vec![a.clone(), b.clone()]);
        assert_eq!(event.operations(), &[a, b]);
        assert!(event.origin().is_none());
    }

    #[test]
    fn combine_concatenates_and_keeps_first_origin() {
        let first = PatchOrigin::at("title-input", Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        let second = PatchOrigin::now("tags-input");
        let e1 = PatchEvent::from(set(p("a"), json!(1))).with_origin(first.clone());
        let e2 = PatchEvent::from(unset(p("b"))).with_origin(second.clone());

        let both = e1.combine(&e2);
        assert_eq!(both.len(), 2);
        assert_eq!(both.operations()[0].op_name(), "set");
        assert_eq!(both.operations()[1].op_name(), "unset");
        assert_eq!(both.origin(), Some(&first));

        let bare = PatchEvent::from(inc(p("n"), 1.0));
        assert_eq!(bare.combine(&e2).origin(), Some(&second));
        assert_eq!(e1.len(), 1, "inputs are untouched");
    }

    #[test]
    fn prefix_all_and_focus_are_inverse() {
        let local = PatchEvent::from(vec![set(p("_ref"), json!("x")), unset(p("_weak"))]);
        let prefix = p(r#"body[_key=="b1"].author"#);
        let moved = local.prefix_all(&prefix);
        assert_eq!(moved.operations()[0].path(), &p(r#"body[_key=="b1"].author._ref"#));
        assert_eq!(moved.focus(&prefix), local);
    }

    #[test]
    fn focus_drops_operations_outside_prefix() {
        let event = PatchEvent::from(vec![set(p("a.b"), json!(1)), set(p("c"), json!(2))]);
        let focused = event.focus(&p("a"));
        assert_eq!(focused.operations(), &[set(p("b"), json!(1))]);
    }

    #[test]
    fn filter_keeps_matching_in_order() {
        let event = PatchEvent::from(vec![
            set(p("a"), json!(1)),
            unset(p("b")),
            set(p("c"), json!(3)),
        ]);
        let sets = event.filter(|op| op.op_name() == "set");
        assert_eq!(sets.operations(), &[set(p("a"), json!(1)), set(p("c"), json!(3))]);
    }

    #[test]
    fn prepend_and_append() {
        let event = PatchEvent::from(set(p("b"), json!(2)))
            .prepend([set(p("a"), json!(1))])
            .append(vec![set(p("c"), json!(3))]);
        let paths: Vec<String> = event.iter().map(|op| op.path().to_string()).collect();
        assert_eq!(paths, ["a", "b", "c"]);
    }
}
