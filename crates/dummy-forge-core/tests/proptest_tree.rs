// crates/dummy-forge-core/tests/proptest_tree.rs
// ============================================================================
// Module: Field Tree Property-Based Tests
// Description: Structural properties of forest derivations.
// Purpose: Check counting and derivations over arbitrary forests.
// Dependencies: dummy-forge-core, proptest
// ============================================================================

//! ## Overview
//! Generates arbitrary field forests and checks that counting, the blueprint,
//! the skeleton, and the record schema agree with each other.

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

use dummy_forge_core::FieldNode;
use dummy_forge_core::FieldType;
use dummy_forge_core::RecordValidator;
use dummy_forge_core::build_skeleton;
use dummy_forge_core::count_fields;
use dummy_forge_core::render_blueprint;
use proptest::prelude::*;

/// Strategy for a field type label.
fn field_type_strategy() -> impl Strategy<Value = FieldType> {
    prop::sample::select(FieldType::ALL.to_vec())
}

/// Strategy for a single node with bounded depth.
fn node_strategy() -> impl Strategy<Value = FieldNode> {
    let leaf = (field_type_strategy(), "[a-z]{1,4}", "[a-z ]{0,8}").prop_map(
        |(field_type, name, description)| {
            FieldNode::new(name, field_type).with_description(description)
        },
    );
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            prop::sample::select(vec![FieldType::Object, FieldType::Array]),
            "[a-z]{1,4}",
            prop::collection::vec(inner, 0 .. 4),
        )
            .prop_map(|(field_type, name, children)| {
                FieldNode::new(name, field_type).with_children(dedup_names(children))
            })
    })
}

/// Strategy for a forest with unique sibling names.
fn forest_strategy() -> impl Strategy<Value = Vec<FieldNode>> {
    prop::collection::vec(node_strategy(), 1 .. 6).prop_map(dedup_names)
}

/// Drops later siblings that repeat an earlier name.
fn dedup_names(nodes: Vec<FieldNode>) -> Vec<FieldNode> {
    let mut seen = std::collections::BTreeSet::new();
    nodes.into_iter().filter(|node| seen.insert(node.name.clone())).collect()
}

/// Counts nodes with an explicit stack.
fn count_by_stack(fields: &[FieldNode]) -> usize {
    let mut stack: Vec<&FieldNode> = fields.iter().collect();
    let mut count = 0;
    while let Some(node) = stack.pop() {
        count += 1;
        stack.extend(node.children.iter());
    }
    count
}

proptest! {
    #[test]
    fn count_matches_explicit_traversal(forest in forest_strategy()) {
        prop_assert_eq!(count_fields(&forest), count_by_stack(&forest));
    }

    #[test]
    fn blueprint_has_one_line_per_node(forest in forest_strategy()) {
        let blueprint = render_blueprint(&forest);
        prop_assert_eq!(blueprint.lines().count(), count_fields(&forest));
        prop_assert_eq!(render_blueprint(&forest), blueprint);
    }

    #[test]
    fn skeleton_has_one_key_per_root(forest in forest_strategy()) {
        let skeleton = build_skeleton(&forest);
        let object = skeleton.as_object().unwrap();
        prop_assert_eq!(object.len(), forest.len());
        for node in &forest {
            prop_assert!(object.contains_key(&node.name));
        }
    }

    #[test]
    fn record_schema_compiles(forest in forest_strategy()) {
        prop_assert!(RecordValidator::new(&forest).is_ok());
    }
}
