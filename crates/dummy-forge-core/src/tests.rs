// crates/dummy-forge-core/src/tests.rs
// ============================================================================
// Module: Core Unit Tests
// Description: Unit tests for labels, limits, and small helpers.
// Purpose: Pin stable wire labels and clamping behavior.
// Dependencies: dummy-forge-core
// ============================================================================

//! ## Overview
//! Covers label round-trips for [`crate::FieldType`] and [`crate::ModelKey`]
//! and clamping of oversized counts.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use serde_json::json;

use crate::FieldNode;
use crate::FieldType;
use crate::ModelKey;
use crate::limits::clamp_count;

#[test]
fn field_type_labels_round_trip() {
    for kind in FieldType::ALL {
        assert_eq!(FieldType::parse(kind.as_str()), Some(kind));
        let encoded = serde_json::to_value(kind).unwrap();
        assert_eq!(encoded, json!(kind.as_str()));
    }
    assert_eq!(FieldType::parse("integer"), None);
}

#[test]
fn model_key_labels_round_trip() {
    assert_eq!(ModelKey::parse("chatgpt"), Some(ModelKey::ChatGpt));
    assert_eq!(ModelKey::parse("gemini"), Some(ModelKey::Gemini));
    assert_eq!(ModelKey::parse("claude"), None);
    assert_eq!(serde_json::to_value(ModelKey::ChatGpt).unwrap(), json!("chatgpt"));
}

#[test]
fn clamp_count_caps_at_maximum() {
    assert_eq!(clamp_count(3, 5), 3);
    assert_eq!(clamp_count(5, 5), 5);
    assert_eq!(clamp_count(7, 5), 5);
    assert_eq!(clamp_count(u64::MAX, 50), 50);
}

#[test]
fn field_node_deserializes_with_defaults() {
    let node: FieldNode =
        serde_json::from_value(json!({"id": "1", "name": "id", "type": "string", "value": ""}))
            .unwrap();
    assert_eq!(node.description, "");
    assert!(node.children.is_empty());
    assert_eq!(node.description(), None);
}
