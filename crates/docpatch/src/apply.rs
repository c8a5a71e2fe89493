//! Applying patch events to documents.

use serde_json::{Map, Number, Value};
use tracing::{debug, trace};

use docpatch_path::get::expected_shape;
use docpatch_path::{locate_index, resolve_mut, resolve_with, type_name};

use crate::event::PatchEvent;
use crate::types::{
    ApplyError, ApplyOptions, InsertPosition, ItemRef, PatchError, PatchOperation, PathAddress,
    PathSegment,
};

/// Apply `event` to `doc` with default options.
///
/// Operations run in list order and **each one sees the result of the
/// operations before it**: `[set(n, 1), inc(n, 1)]` leaves `n == 2`. An
/// event is a sequential chain, not a batch evaluated against the original
/// snapshot.
///
/// The input document is never modified. If any operation fails the whole
/// event fails: the error names the failing operation's index and no
/// partial document is returned.
///
/// `unset` through an index path is not idempotent: array elements shift
/// left after a removal, so the same index then names the next element.
/// Address elements with keyed selectors where a repeatable removal is
/// needed. See [`PatchOperation::Unset`].
///
/// # Example
///
/// ```
/// use docpatch::{apply, inc, PatchEvent, PathAddress};
/// use serde_json::json;
///
/// let doc = json!({"title": "A", "tags": [{"_key": "x", "v": 1}]});
/// let path: PathAddress = r#"tags[_key=="x"].v"#.parse().unwrap();
/// let next = apply(&doc, &PatchEvent::from(inc(path, 2.0))).unwrap();
/// assert_eq!(next, json!({"title": "A", "tags": [{"_key": "x", "v": 3}]}));
/// ```
pub fn apply(doc: &Value, event: &PatchEvent) -> Result<Value, ApplyError> {
    apply_with(doc, event, &ApplyOptions::default())
}

/// Apply `event` to `doc` with explicit options. Same semantics as [`apply`].
pub fn apply_with(doc: &Value, event: &PatchEvent, options: &ApplyOptions) -> Result<Value, ApplyError> {
    let mut working = doc.clone();
    for (index, op) in event.iter().enumerate() {
        debug!(index, op = op.op_name(), path = %op.path(), "applying patch operation");
        if let Err(error) = apply_op(&mut working, op, options) {
            debug!(index, %error, "patch operation failed, discarding event");
            return Err(ApplyError { index, error });
        }
    }
    Ok(working)
}

/// Apply a single operation to `doc` in place.
///
/// On error `doc` may hold a partial result; [`apply_with`] only ever runs
/// this against its private working copy.
pub fn apply_op(doc: &mut Value, op: &PatchOperation, options: &ApplyOptions) -> Result<(), PatchError> {
    let id = options.identity_field.as_str();
    match op {
        PatchOperation::Set { path, value } => apply_set(doc, path, value.clone(), id),
        PatchOperation::SetIfMissing { path, value } => apply_set_if_missing(doc, path, value, id),
        PatchOperation::Unset { path } => apply_unset(doc, path, id),
        PatchOperation::Insert {
            path,
            position,
            reference,
            items,
        } => apply_insert(doc, path, *position, reference, items, id),
        PatchOperation::Inc { path, amount } => apply_inc(doc, path, *amount, id),
        PatchOperation::Dec { path, amount } => apply_inc(doc, path, -*amount, id),
    }
}

// ── Individual operation applicators ─────────────────────────────────────

fn apply_set(doc: &mut Value, path: &PathAddress, value: Value, id: &str) -> Result<(), PatchError> {
    let Some((parent_path, last)) = path.split_last() else {
        *doc = value;
        return Ok(());
    };
    let parent = resolve_mut(doc, &parent_path, id)?.ok_or_else(|| PatchError::missing_parent(path))?;
    write_child(parent, &parent_path, last, value, path, id)
}

fn apply_set_if_missing(doc: &mut Value, path: &PathAddress, value: &Value, id: &str) -> Result<(), PatchError> {
    if resolve_with(doc, path, id)?.is_some_and(|existing| !existing.is_null()) {
        trace!(path = %path, "value present, setIfMissing is a no-op");
        return Ok(());
    }
    let Some((parent_path, last)) = path.split_last() else {
        *doc = value.clone();
        return Ok(());
    };
    let parent = ensure_parent(doc, &parent_path, last, path, id)?;
    write_child(parent, &parent_path, last, value.clone(), path, id)
}

fn apply_unset(doc: &mut Value, path: &PathAddress, id: &str) -> Result<(), PatchError> {
    let Some((parent_path, last)) = path.split_last() else {
        *doc = Value::Null;
        return Ok(());
    };
    let Some(parent) = resolve_mut(doc, &parent_path, id)? else {
        trace!(path = %path, "parent absent, unset is a no-op");
        return Ok(());
    };
    match (last, parent) {
        (PathSegment::Key(k), Value::Object(map)) => {
            map.shift_remove(k);
        }
        (seg, Value::Array(arr)) if seg.is_array_step() => {
            if let Some(i) = locate_index(arr, seg, id) {
                arr.remove(i);
            }
        }
        (_, Value::Null) => {}
        (seg, other) => return Err(mismatch(&parent_path, seg, other)),
    }
    Ok(())
}

fn apply_insert(
    doc: &mut Value,
    path: &PathAddress,
    position: InsertPosition,
    reference: &ItemRef,
    items: &[Value],
    id: &str,
) -> Result<(), PatchError> {
    let reference_segment = reference.to_segment();
    let missing = || {
        let mut target = path.clone();
        target.push(reference_segment.clone());
        PatchError::missing_parent(&target)
    };
    let arr = match resolve_mut(doc, path, id)? {
        Some(Value::Array(arr)) => arr,
        None | Some(Value::Null) => return Err(missing()),
        Some(other) => {
            return Err(PatchError::TypeMismatch {
                path: path.clone(),
                expected: "array",
                found: type_name(other),
            })
        }
    };
    // Index `len` is the one-past-the-end slot: only `before` may target it,
    // which is how items get into an empty array.
    let at = match (reference, position) {
        (ItemRef::Index(i), InsertPosition::Before) if *i == arr.len() => *i,
        _ => locate_index(arr, &reference_segment, id).ok_or_else(missing)?,
    };
    let range = match position {
        InsertPosition::Before => at..at,
        InsertPosition::After => at + 1..at + 1,
        InsertPosition::Replace => at..at + 1,
    };
    arr.splice(range, items.iter().cloned()).for_each(drop);
    Ok(())
}

fn apply_inc(doc: &mut Value, path: &PathAddress, delta: f64, id: &str) -> Result<(), PatchError> {
    let current = match resolve_with(doc, path, id)? {
        Some(Value::Number(n)) => n.clone(),
        Some(other) => return Err(not_a_number(path, type_name(other))),
        None => {
            let parent_present = match path.parent() {
                Some(parent_path) => resolve_with(doc, &parent_path, id)?.is_some_and(|v| !v.is_null()),
                None => true,
            };
            if !parent_present {
                return Err(PatchError::missing_parent(path));
            }
            return Err(not_a_number(path, "absent"));
        }
    };
    let next = add_number(&current, delta).ok_or_else(|| PatchError::TypeMismatch {
        path: path.clone(),
        expected: "finite number",
        found: "non-finite result",
    })?;
    if let Some(target) = resolve_mut(doc, path, id)? {
        *target = Value::Number(next);
    }
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────

/// Write `value` into the child of `parent` that `last` addresses.
fn write_child(
    parent: &mut Value,
    parent_path: &PathAddress,
    last: &PathSegment,
    value: Value,
    path: &PathAddress,
    id: &str,
) -> Result<(), PatchError> {
    match (last, parent) {
        (PathSegment::Key(k), Value::Object(map)) => {
            map.insert(k.clone(), value);
            Ok(())
        }
        (seg, Value::Array(arr)) if seg.is_array_step() => {
            let i = locate_index(arr, seg, id).ok_or_else(|| PatchError::missing_parent(path))?;
            arr[i] = value;
            Ok(())
        }
        (_, Value::Null) => Err(PatchError::missing_parent(path)),
        (seg, other) => Err(mismatch(parent_path, seg, other)),
    }
}

/// Walk to the parent of `path`, creating missing object keys on the way.
/// Array elements are never invented: a missing one is a missing parent.
fn ensure_parent<'a>(
    doc: &'a mut Value,
    parent_path: &PathAddress,
    last: &PathSegment,
    path: &PathAddress,
    id: &str,
) -> Result<&'a mut Value, PatchError> {
    let segments = parent_path.segments();
    let mut current = doc;
    for (depth, segment) in segments.iter().enumerate() {
        if current.is_null() && segment.as_key().is_some() {
            *current = Value::Object(Map::new());
        }
        // Check the step on a shared borrow first; the mutable step below
        // then has no error of its own while it holds `current`.
        let element = match (segment, &*current) {
            (PathSegment::Key(_), Value::Object(_)) => None,
            (seg, Value::Array(arr)) if seg.is_array_step() => {
                Some(locate_index(arr, seg, id).ok_or_else(|| PatchError::missing_parent(path))?)
            }
            (_, Value::Null) => return Err(PatchError::missing_parent(path)),
            (seg, other) => {
                let at = PathAddress::from_segments(segments[..depth].to_vec());
                return Err(mismatch(&at, seg, other));
            }
        };
        let next = match (segment, current) {
            (PathSegment::Key(k), Value::Object(map)) => Some(map.entry(k.clone()).or_insert(Value::Null)),
            (_, Value::Array(arr)) => element.and_then(|i| arr.get_mut(i)),
            _ => None,
        };
        current = next.ok_or_else(|| PatchError::missing_parent(path))?;
    }
    if current.is_null() && last.as_key().is_some() {
        *current = Value::Object(Map::new());
    }
    Ok(current)
}

fn mismatch(at: &PathAddress, segment: &PathSegment, found: &Value) -> PatchError {
    PatchError::TypeMismatch {
        path: at.clone(),
        expected: expected_shape(segment),
        found: type_name(found),
    }
}

fn not_a_number(path: &PathAddress, found: &'static str) -> PatchError {
    PatchError::TypeMismatch {
        path: path.clone(),
        expected: "number",
        found,
    }
}

// Largest magnitude at which every integer is exactly representable as f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// `current + delta`, staying integral when both sides are integers and the
/// sum fits in `i64`.
fn add_number(current: &Number, delta: f64) -> Option<Number> {
    if delta.fract() == 0.0 && delta.abs() <= MAX_SAFE_INTEGER {
        if let Some(sum) = current.as_i64().and_then(|i| i.checked_add(delta as i64)) {
            return Some(Number::from(sum));
        }
    }
    Number::from_f64(current.as_f64()? + delta)
}

// ── Tests ─────────────────────────────────────────────────────────────────
