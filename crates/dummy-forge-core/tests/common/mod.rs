// crates/dummy-forge-core/tests/common/mod.rs
// =============================================================================
// Module: Core Test Helpers
// Description: Shared field forests and payload builders.
// Purpose: Reduce duplication across integration tests for dummy-forge-core.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use dummy_forge_core::FieldNode;
use dummy_forge_core::FieldType;
use serde_json::Value;
use serde_json::json;

/// Returns the two-field forest used by the end-to-end scenario.
pub fn id_age_forest() -> Vec<FieldNode> {
    vec![FieldNode::new("id", FieldType::String), FieldNode::new("age", FieldType::Number)]
}

/// Returns a nested forest covering every field type.
pub fn nested_forest() -> Vec<FieldNode> {
    vec![
        FieldNode::new("id", FieldType::String).with_description("UUID v4"),
        FieldNode::new("score", FieldType::Number),
        FieldNode::new("active", FieldType::Boolean),
        FieldNode::new("deleted_at", FieldType::Null),
        FieldNode::new("profile", FieldType::Object).with_children(vec![
            FieldNode::new("name", FieldType::String),
            FieldNode::new("address", FieldType::Object)
                .with_children(vec![FieldNode::new("city", FieldType::String)]),
        ]),
        FieldNode::new("tags", FieldType::Array),
        FieldNode::new("orders", FieldType::Array).with_children(vec![
            FieldNode::new("sku", FieldType::String),
            FieldNode::new("qty", FieldType::Number),
        ]),
    ]
}

/// Returns a flat forest with `count` string fields.
pub fn flat_forest(count: usize) -> Vec<FieldNode> {
    (0 .. count).map(|index| FieldNode::new(format!("field_{index}"), FieldType::String)).collect()
}

/// Serializes a forest into wire-format field nodes.
pub fn fields_json(fields: &[FieldNode]) -> Value {
    serde_json::to_value(fields).expect("forest serializes")
}

/// Builds a request payload for the given forest.
pub fn payload(model: &str, samples: u64, records: u64, fields: &[FieldNode]) -> Value {
    json!({
        "model": model,
        "samples": samples,
        "recordsPerSample": records,
        "fields": fields_json(fields),
    })
}
