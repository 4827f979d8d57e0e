//! Fixture-driven validate/resolve pipeline tests.

use motif_core::validate::codes;
use motif_core::{resolve, validate, validate_str};
use motif_test_fixtures as fixtures;

#[test]
fn fixtures_validate_and_resolve_cleanly() {
    for name in fixtures::documents::keys() {
        let json = fixtures::documents::json(&name).expect("fixture should load");
        let validation = validate_str(&json);
        assert!(
            validation.valid,
            "fixture '{name}' should validate: {:?}",
            validation.errors
        );
        let doc = validation.data.expect("valid documents carry data");
        let resolution = resolve(&doc);
        assert!(
            resolution.errors.is_empty(),
            "fixture '{name}' should resolve: {:?}",
            resolution.errors
        );
    }
}

/// it should re-validate its own serialized output with zero errors
#[test]
fn round_trip_idempotence() {
    for name in fixtures::documents::keys() {
        let json = fixtures::documents::json(&name).expect("fixture should load");
        let first = validate_str(&json);
        let doc = first.data.expect("fixture should validate");
        let serialized = serde_json::to_value(&doc).expect("document should serialize");
        let second = validate(&serialized);
        assert!(
            second.valid,
            "round-trip of '{name}' should stay valid: {:?}",
            second.errors
        );
        assert!(second.errors.is_empty());
    }
}

/// it should keep unknown fields on elements and blocks through a round trip
#[test]
fn unknown_nested_fields_survive_round_trip() {
    let json = r#"{
        "version": "1.0",
        "elements": {"card": {"type": "box", "initial": {"x": 0}, "futureProp": 7}},
        "timeline": {"sequences": [{
            "trigger": {"type": "mount"},
            "futureFlag": true,
            "animations": [
                {"type": "transition", "target": "card", "to": {"x": 1},
                 "duration": 100, "futureKnob": "soft"}
            ]
        }]}
    }"#;
    let validation = validate_str(json);
    assert!(validation.valid, "{:?}", validation.errors);
    let out = serde_json::to_value(&validation.data.unwrap()).unwrap();
    assert_eq!(out["elements"]["card"]["futureProp"], 7);
    assert_eq!(out["timeline"]["sequences"][0]["futureFlag"], true);
    assert_eq!(
        out["timeline"]["sequences"][0]["animations"][0]["futureKnob"],
        "soft"
    );
}

/// it should report every violation in one pass
#[test]
fn invalid_fixture_accumulates_errors() {
    let json = fixtures::invalid::json("multiple-violations").expect("fixture should load");
    let validation = validate_str(&json);
    assert!(!validation.valid);
    assert!(validation.data.is_none());
    assert!(
        validation.errors.len() >= 2,
        "expected multiple accumulated errors, got {:?}",
        validation.errors
    );
    let codes_seen: Vec<&str> = validation.errors.iter().map(|e| e.code).collect();
    assert!(codes_seen.contains(&codes::INVALID_VERSION));
    assert!(codes_seen.contains(&codes::UNKNOWN_VARIANT));
    assert!(validation.errors.iter().any(|e| e.path == "version"));
    assert!(validation
        .errors
        .iter()
        .any(|e| e.path == "timeline.sequences[0].animations[0].duration"));
}

#[test]
fn malformed_expressions_are_path_tagged() {
    let json = fixtures::invalid::json("bad-expression").expect("fixture should load");
    let validation = validate_str(&json);
    assert!(!validation.valid);
    assert_eq!(validation.errors.len(), 2);
    for error in &validation.errors {
        assert_eq!(error.code, codes::INVALID_EXPRESSION);
        assert!(error.path.starts_with("elements.card.initial."));
    }
}

/// it should reject mixed number/expression value arrays with indexed paths
#[test]
fn mixed_value_arrays_are_rejected_in_place() {
    let json = r#"{
        "version": "1.0",
        "variables": {"a": 5},
        "elements": {"card": {"type": "box", "initial": {"x": [0, "$a", 10]}}}
    }"#;
    let validation = validate_str(json);
    assert!(!validation.valid);
    assert_eq!(validation.errors.len(), 1);
    assert_eq!(validation.errors[0].path, "elements.card.initial.x[1]");
    assert_eq!(validation.errors[0].code, codes::INVALID_TYPE);
}

/// it should fold a parse failure into a single root error
#[test]
fn parse_failure_is_one_root_error() {
    let validation = validate_str("{not json");
    assert!(!validation.valid);
    assert_eq!(validation.errors.len(), 1);
    assert_eq!(validation.errors[0].code, codes::PARSE);
    assert_eq!(validation.errors[0].path, "");
}
