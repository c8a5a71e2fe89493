use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use docpatch::codec::json::event_from_json;
use docpatch::{apply, ErrorKind};

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    scenario: Vec<Scenario>,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    doc: String,
    patch: String,
    expected: Option<String>,
    error: Option<String>,
    index: Option<usize>,
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_scenarios() -> Vec<Scenario> {
    let path = fixtures_dir().join("scenarios.toml");
    let text = fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {:?}: {e}", path));
    let file: ScenarioFile =
        toml::from_str(&text).unwrap_or_else(|e| panic!("failed to parse {:?}: {e}", path));
    file.scenario
}

fn parse_json(name: &str, field: &str, text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|e| panic!("{name}: bad {field} JSON: {e}"))
}

fn error_kind(name: &str) -> ErrorKind {
    match name {
        "typeMismatch" => ErrorKind::TypeMismatch,
        "missingParent" => ErrorKind::MissingParent,
        "invalidOp" => ErrorKind::InvalidOp,
        other => panic!("unknown error kind in fixture: {other}"),
    }
}

#[test]
fn scenarios_replay() {
    let scenarios = load_scenarios();
    assert!(!scenarios.is_empty(), "no scenarios loaded");

    for s in &scenarios {
        let doc = parse_json(&s.name, "doc", &s.doc);
        let event = event_from_json(&parse_json(&s.name, "patch", &s.patch))
            .unwrap_or_else(|e| panic!("{}: patch did not decode: {e}", s.name));

        match (&s.expected, &s.error) {
            (Some(expected), None) => {
                let out = apply(&doc, &event)
                    .unwrap_or_else(|e| panic!("{}: apply failed: {e}", s.name));
                assert_eq!(out, parse_json(&s.name, "expected", expected), "{}", s.name);
            }
            (None, Some(kind)) => {
                let err = apply(&doc, &event).expect_err(&s.name);
                assert_eq!(err.kind(), error_kind(kind), "{}: {err}", s.name);
                if let Some(index) = s.index {
                    assert_eq!(err.index, index, "{}", s.name);
                }
            }
            _ => panic!("{}: scenario needs exactly one of `expected` or `error`", s.name),
        }
    }
}

#[test]
fn scenario_names_are_unique() {
    let scenarios = load_scenarios();
    let mut names: Vec<&str> = scenarios.iter().map(|s| s.name.as_str()).collect();
    names.sort_unstable();
    let before = names.len();
    names.dedup();
    assert_eq!(before, names.len(), "duplicate scenario names");
}
