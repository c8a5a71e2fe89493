//! Wire form of path addresses.
//!
//! A path is a JSON array of segments: a bare string is a key, a bare
//! non-negative integer an index, and `{"_key": "<id>"}` a keyed selector.

use serde_json::{json, Map, Value};

use crate::types::{PathAddress, PathSegment, DEFAULT_IDENTITY_FIELD};
use crate::validate::validate_path;
use crate::PathError;

pub fn segment_to_json(segment: &PathSegment) -> Value {
    match segment {
        PathSegment::Key(k) => Value::String(k.clone()),
        PathSegment::Index(i) => json!(i),
        PathSegment::Keyed(id) => {
            let mut map = Map::new();
            map.insert(DEFAULT_IDENTITY_FIELD.to_string(), Value::String(id.clone()));
            Value::Object(map)
        }
    }
}

pub fn segment_from_json(value: &Value) -> Result<PathSegment, PathError> {
    match value {
        Value::String(k) => Ok(PathSegment::Key(k.clone())),
        Value::Number(n) => n
            .as_u64()
            .and_then(|i| usize::try_from(i).ok())
            .map(PathSegment::Index)
            .ok_or_else(|| PathError::InvalidPath(format!("invalid index segment: {n}"))),
        Value::Object(map) if map.len() == 1 => match map.get(DEFAULT_IDENTITY_FIELD) {
            Some(Value::String(id)) => Ok(PathSegment::Keyed(id.clone())),
            _ => Err(PathError::InvalidPath(format!("invalid keyed segment: {value}"))),
        },
        other => Err(PathError::InvalidPath(format!("invalid path segment: {other}"))),
    }
}

/// Encode an address as a JSON array of segments.
pub fn path_to_json(path: &PathAddress) -> Value {
    Value::Array(path.segments().iter().map(segment_to_json).collect())
}

/// Decode and validate an address from its JSON array form.
///
/// # Example
///
/// ```
/// use docpatch_path::{path_from_json, PathAddress};
/// use serde_json::json;
///
/// let path = path_from_json(&json!(["tags", {"_key": "x"}, "v", 0])).unwrap();
/// assert_eq!(path, PathAddress::root().key("tags").keyed("x").key("v").index(0));
/// ```
pub fn path_from_json(value: &Value) -> Result<PathAddress, PathError> {
    let items = value
        .as_array()
        .ok_or_else(|| PathError::InvalidPath("path must be an array".to_string()))?;
    let path = items
        .iter()
        .map(segment_from_json)
        .collect::<Result<PathAddress, _>>()?;
    validate_path(&path)?;
    Ok(path)
}
