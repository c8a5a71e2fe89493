use serde_json::Value;

use crate::types::{PathAddress, PathSegment, DEFAULT_IDENTITY_FIELD};
use crate::PathError;

/// Resolve `path` against `doc`, using `_key` as the identity field for
/// keyed selectors.
///
/// `Ok(None)` means the location is absent: a missing key, an index past
/// the end, a keyed selector with no matching element, or a `null` met on
/// the way. Only a value of the wrong shape along the path is an error.
///
/// # Example
///
/// ```
/// use docpatch_path::{resolve, PathAddress};
/// use serde_json::json;
///
/// let doc = json!({"tags": [{"_key": "x", "v": 1}]});
/// let path = PathAddress::root().key("tags").keyed("x").key("v");
/// assert_eq!(resolve(&doc, &path).unwrap(), Some(&json!(1)));
///
/// let missing = PathAddress::root().key("tags").keyed("y");
/// assert_eq!(resolve(&doc, &missing).unwrap(), None);
/// ```
pub fn resolve<'a>(doc: &'a Value, path: &PathAddress) -> Result<Option<&'a Value>, PathError> {
    resolve_with(doc, path, DEFAULT_IDENTITY_FIELD)
}

/// Like [`resolve`], with a caller-chosen identity field.
pub fn resolve_with<'a>(
    doc: &'a Value,
    path: &PathAddress,
    identity_field: &str,
) -> Result<Option<&'a Value>, PathError> {
    let mut current = doc;
    for (depth, segment) in path.segments().iter().enumerate() {
        let next = match (segment, current) {
            (_, Value::Null) => return Ok(None),
            (PathSegment::Key(k), Value::Object(map)) => map.get(k),
            (PathSegment::Index(i), Value::Array(arr)) => arr.get(*i),
            (PathSegment::Keyed(id), Value::Array(arr)) => {
                find_keyed(arr, id, identity_field).map(|i| &arr[i])
            }
            (segment, found) => return Err(mismatch(path, depth, segment, found)),
        };
        match next {
            Some(v) => current = v,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

/// Mutable counterpart of [`resolve_with`], with the same absent/error rules.
pub fn resolve_mut<'a>(
    doc: &'a mut Value,
    path: &PathAddress,
    identity_field: &str,
) -> Result<Option<&'a mut Value>, PathError> {
    let mut current = doc;
    for (depth, segment) in path.segments().iter().enumerate() {
        let next = match (segment, current) {
            (_, Value::Null) => None,
            (PathSegment::Key(k), Value::Object(map)) => map.get_mut(k),
            (PathSegment::Index(i), Value::Array(arr)) => arr.get_mut(*i),
            (PathSegment::Keyed(id), Value::Array(arr)) => {
                match find_keyed(arr, id, identity_field) {
                    Some(i) => arr.get_mut(i),
                    None => None,
                }
            }
            (segment, found) => return Err(mismatch(path, depth, segment, found)),
        };
        match next {
            Some(v) => current = v,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

/// Position of the element an array segment selects in `arr`, if any.
///
/// Key segments never select an array element.
pub fn locate_index(arr: &[Value], segment: &PathSegment, identity_field: &str) -> Option<usize> {
    match segment {
        PathSegment::Index(i) if *i < arr.len() => Some(*i),
        PathSegment::Index(_) | PathSegment::Key(_) => None,
        PathSegment::Keyed(id) => find_keyed(arr, id, identity_field),
    }
}

fn find_keyed(arr: &[Value], id: &str, identity_field: &str) -> Option<usize> {
    arr.iter()
        .position(|item| item.get(identity_field).and_then(Value::as_str) == Some(id))
}

fn mismatch(path: &PathAddress, depth: usize, segment: &PathSegment, found: &Value) -> PathError {
    PathError::TypeMismatch {
        path: PathAddress::from_segments(path.segments()[..depth].to_vec()),
        expected: expected_shape(segment),
        found: type_name(found),
    }
}

/// The container shape a segment needs to step into.
pub fn expected_shape(segment: &PathSegment) -> &'static str {
    match segment {
        PathSegment::Key(_) => "object",
        PathSegment::Index(_) | PathSegment::Keyed(_) => "array",
    }
}

/// JSON type name of a value, as used in error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
