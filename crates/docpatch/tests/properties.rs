use docpatch::{
    apply, inc, set, set_if_missing, unset, PatchEvent, PatchOperation, PathAddress,
};
use docpatch_path::resolve;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,4}".prop_map(Value::String),
    ]
}

fn present_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,4}".prop_map(Value::String),
    ]
}

fn object_of(values: impl Strategy<Value = Value>) -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-e]", values, 0..5)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>()))
}

fn document() -> impl Strategy<Value = Value> {
    object_of(prop_oneof![leaf(), object_of(leaf())])
}

/// A document with a `list` of elements carrying distinct `_key`s.
fn keyed_document() -> impl Strategy<Value = Value> {
    (document(), prop::collection::btree_map("[a-e]", leaf(), 0..5)).prop_map(|(mut doc, items)| {
        let list = items
            .into_iter()
            .map(|(id, v)| json!({"_key": id, "v": v}))
            .collect::<Vec<_>>();
        doc["list"] = Value::Array(list);
        doc
    })
}

fn key_path() -> impl Strategy<Value = PathAddress> {
    prop::collection::vec("[a-e]", 1..3)
        .prop_map(|keys| keys.into_iter().fold(PathAddress::root(), PathAddress::key))
}

/// Key paths, with the root mixed in.
fn any_path() -> impl Strategy<Value = PathAddress> {
    prop_oneof![
        1 => Just(PathAddress::root()),
        4 => key_path(),
    ]
}

fn keyed_path() -> impl Strategy<Value = PathAddress> {
    ("[a-e]", prop::option::of("[a-e]")).prop_map(|(id, field)| {
        let path = PathAddress::root().key("list").keyed(id);
        match field {
            Some(f) => path.key(f),
            None => path,
        }
    })
}

// Root unset is left out: it leaves `null` where a relocated unset removes
// the field, so it has its own test in the apply module.
fn operation() -> impl Strategy<Value = PatchOperation> {
    prop_oneof![
        (any_path(), leaf()).prop_map(|(p, v)| set(p, v)),
        (any_path(), leaf()).prop_map(|(p, v)| set_if_missing(p, v)),
        key_path().prop_map(|p| unset(p)),
        any_path().prop_map(|p| inc(p, 1.0)),
    ]
}

fn event() -> impl Strategy<Value = PatchEvent> {
    prop::collection::vec(operation(), 0..6).prop_map(PatchEvent::from)
}

proptest! {
    #[test]
    fn set_then_resolve_reads_back(doc in document(), k in "[a-e]", v in leaf()) {
        let path = PathAddress::root().key(k);
        let out = apply(&doc, &PatchEvent::from(set(path.clone(), v.clone()))).unwrap();
        prop_assert_eq!(resolve(&out, &path).unwrap(), Some(&v));
    }

    #[test]
    fn nested_set_then_resolve_reads_back(
        doc in document(),
        outer in "[a-e]",
        inner in object_of(leaf()),
        k in "[a-e]",
        v in leaf(),
    ) {
        let mut doc = doc;
        doc[outer.as_str()] = inner;
        let path = PathAddress::root().key(outer).key(k);
        let out = apply(&doc, &PatchEvent::from(set(path.clone(), v.clone()))).unwrap();
        prop_assert_eq!(resolve(&out, &path).unwrap(), Some(&v));
    }

    #[test]
    fn set_if_missing_keeps_present_values(
        doc in document(),
        outer in "[a-e]",
        inner in "[a-e]",
        existing in present_leaf(),
        nested in any::<bool>(),
        v in leaf(),
    ) {
        let mut doc = doc;
        let path = if nested {
            doc[outer.as_str()] = json!({ inner.as_str(): existing });
            PathAddress::root().key(outer).key(inner)
        } else {
            doc[outer.as_str()] = existing;
            PathAddress::root().key(outer)
        };
        let out = apply(&doc, &PatchEvent::from(set_if_missing(path, v))).unwrap();
        prop_assert_eq!(out, doc);
    }

    #[test]
    fn unset_is_idempotent(doc in document(), path in key_path()) {
        let event = PatchEvent::from(unset(path));
        if let Ok(once) = apply(&doc, &event) {
            prop_assert_eq!(apply(&once, &event).unwrap(), once);
        }
    }

    #[test]
    fn keyed_unset_is_idempotent(doc in keyed_document(), path in keyed_path()) {
        let event = PatchEvent::from(unset(path));
        let once = apply(&doc, &event).unwrap();
        prop_assert_eq!(apply(&once, &event).unwrap(), once);
    }

    #[test]
    fn combine_equals_sequential_apply(doc in document(), e1 in event(), e2 in event()) {
        let combined = e1.combine(&e2);
        let expected_ops: Vec<PatchOperation> = e1.iter().chain(e2.iter()).cloned().collect();
        prop_assert_eq!(combined.operations(), expected_ops.as_slice());

        let together = apply(&doc, &combined);
        let stepwise = apply(&doc, &e1).and_then(|mid| {
            apply(&mid, &e2).map_err(|mut e| {
                e.index += e1.len();
                e
            })
        });
        match (together, stepwise) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => {
                prop_assert_eq!(a.index, b.index);
                prop_assert_eq!(a.kind(), b.kind());
            }
            (a, b) => prop_assert!(false, "diverged: {:?} vs {:?}", a, b),
        }
    }

    #[test]
    fn prefix_all_matches_subtree_apply(parent in document(), sub in object_of(leaf()), e in event()) {
        let mut parent = parent;
        parent["field"] = sub.clone();
        let field = PathAddress::root().key("field");

        let via_prefix = apply(&parent, &e.prefix_all(&field));
        let via_subtree = apply(&sub, &e).map(|patched| {
            let mut spliced = parent.clone();
            spliced["field"] = patched;
            spliced
        });
        match (via_prefix, via_subtree) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => {
                prop_assert_eq!(a.index, b.index);
                prop_assert_eq!(a.kind(), b.kind());
            }
            (a, b) => prop_assert!(false, "diverged: {:?} vs {:?}", a, b),
        }
    }
}

#[test]
fn public_types_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PatchEvent>();
    assert_send_sync::<PatchOperation>();
    assert_send_sync::<docpatch::ApplyError>();
}
