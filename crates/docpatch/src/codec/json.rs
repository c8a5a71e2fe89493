//! JSON codec for patch operations and events.
//!
//! An operation is an object tagged by `op`:
//!
//! ```text
//! {"op": "set",          "path": [...], "value": v}
//! {"op": "setIfMissing", "path": [...], "value": v}
//! {"op": "unset",        "path": [...]}
//! {"op": "insert",       "path": [...], "position": "before"|"after"|"replace",
//!                        "reference": <segment>, "items": [...]}
//! {"op": "inc" | "dec",  "path": [...], "amount": n}
//! ```
//!
//! Path segments are bare strings (keys), bare integers (indices) or
//! `{"_key": "<id>"}` (keyed selectors). An event is
//! `{"operations": [...], "origin": {"source": s, "timestamp": rfc3339}}`.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use docpatch_path::{path_from_json, path_to_json, segment_from_json, segment_to_json};

use crate::event::PatchEvent;
use crate::types::{InsertPosition, ItemRef, PatchError, PatchOperation, PatchOrigin, PathAddress};

// ── Helpers ───────────────────────────────────────────────────────────────

fn invalid(msg: impl Into<String>) -> PatchError {
    PatchError::InvalidOp(msg.into())
}

fn required<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a Value, PatchError> {
    obj.get(key).ok_or_else(|| invalid(format!("missing `{key}`")))
}

fn decode_path(obj: &Map<String, Value>) -> Result<PathAddress, PatchError> {
    Ok(path_from_json(required(obj, "path")?)?)
}

// Integral amounts go out as integers so `inc 2` stays `2` on the wire.
fn encode_amount(amount: f64) -> Value {
    if amount.fract() == 0.0 && amount.abs() < 9_007_199_254_740_992.0 {
        json!(amount as i64)
    } else {
        json!(amount)
    }
}

fn decode_amount(obj: &Map<String, Value>) -> Result<f64, PatchError> {
    required(obj, "amount")?
        .as_f64()
        .ok_or_else(|| invalid("amount must be a number"))
}

// ── Operations ────────────────────────────────────────────────────────────

/// Serialize an operation to its wire form.
pub fn to_json(op: &PatchOperation) -> Value {
    let mut m = Map::new();
    m.insert("op".into(), json!(op.op_name()));
    m.insert("path".into(), path_to_json(op.path()));
    match op {
        PatchOperation::Set { value, .. } | PatchOperation::SetIfMissing { value, .. } => {
            m.insert("value".into(), value.clone());
        }
        PatchOperation::Unset { .. } => {}
        PatchOperation::Insert {
            position,
            reference,
            items,
            ..
        } => {
            m.insert("position".into(), json!(position.as_str()));
            m.insert("reference".into(), segment_to_json(&reference.to_segment()));
            m.insert("items".into(), Value::Array(items.clone()));
        }
        PatchOperation::Inc { amount, .. } | PatchOperation::Dec { amount, .. } => {
            m.insert("amount".into(), encode_amount(*amount));
        }
    }
    Value::Object(m)
}

/// Deserialize an operation from its wire form.
pub fn from_json(v: &Value) -> Result<PatchOperation, PatchError> {
    let obj = v
        .as_object()
        .ok_or_else(|| invalid("operation must be an object"))?;
    let op = required(obj, "op")?
        .as_str()
        .ok_or_else(|| invalid("op must be a string"))?;
    let path = decode_path(obj)?;

    match op {
        "set" => Ok(PatchOperation::Set {
            path,
            value: required(obj, "value")?.clone(),
        }),
        "setIfMissing" => Ok(PatchOperation::SetIfMissing {
            path,
            value: required(obj, "value")?.clone(),
        }),
        "unset" => Ok(PatchOperation::Unset { path }),
        "insert" => {
            let position = required(obj, "position")?
                .as_str()
                .ok_or_else(|| invalid("position must be a string"))
                .and_then(InsertPosition::from_name)?;
            let reference = ItemRef::try_from(segment_from_json(required(obj, "reference")?)?)?;
            let items = required(obj, "items")?
                .as_array()
                .ok_or_else(|| invalid("items must be an array"))?
                .clone();
            Ok(PatchOperation::Insert {
                path,
                position,
                reference,
                items,
            })
        }
        "inc" => Ok(PatchOperation::Inc {
            path,
            amount: decode_amount(obj)?,
        }),
        "dec" => Ok(PatchOperation::Dec {
            path,
            amount: decode_amount(obj)?,
        }),
        other => Err(invalid(format!("unknown op: {other}"))),
    }
}

/// Serialize a list of operations to a JSON array.
pub fn to_json_patch(ops: &[PatchOperation]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}

/// Deserialize a JSON array of operations.
pub fn from_json_patch(v: &Value) -> Result<Vec<PatchOperation>, PatchError> {
    v.as_array()
        .ok_or_else(|| invalid("patch must be an array"))?
        .iter()
        .map(from_json)
        .collect()
}

// ── Events ────────────────────────────────────────────────────────────────

fn origin_to_json(origin: &PatchOrigin) -> Value {
    json!({
        "source": origin.source,
        "timestamp": origin.timestamp.to_rfc3339(),
    })
}

fn origin_from_json(v: &Value) -> Result<PatchOrigin, PatchError> {
    let obj = v.as_object().ok_or_else(|| invalid("origin must be an object"))?;
    let source = required(obj, "source")?
        .as_str()
        .ok_or_else(|| invalid("origin source must be a string"))?;
    let timestamp = required(obj, "timestamp")?
        .as_str()
        .ok_or_else(|| invalid("origin timestamp must be a string"))?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|e| invalid(format!("bad origin timestamp: {e}")))?
        .with_timezone(&Utc);
    Ok(PatchOrigin::at(source, timestamp))
}

/// Serialize an event, including its origin when it has one.
pub fn event_to_json(event: &PatchEvent) -> Value {
    let mut m = Map::new();
    m.insert("operations".into(), to_json_patch(event.operations()));
    if let Some(origin) = event.origin() {
        m.insert("origin".into(), origin_to_json(origin));
    }
    Value::Object(m)
}

/// Deserialize an event. A bare array of operations is accepted as an
/// event without origin.
pub fn event_from_json(v: &Value) -> Result<PatchEvent, PatchError> {
    if v.is_array() {
        return Ok(PatchEvent::from(from_json_patch(v)?));
    }
    let obj = v.as_object().ok_or_else(|| invalid("event must be an object or array"))?;
    let event = PatchEvent::from(from_json_patch(required(obj, "operations")?)?);
    match obj.get("origin") {
        Some(origin) if !origin.is_null() => Ok(event.with_origin(origin_from_json(origin)?)),
        _ => Ok(event),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
