// crates/dummy-forge-core/src/transforms.rs
// ============================================================================
// Module: Field Tree Transforms
// Description: Blueprint, skeleton, and record-schema derivations.
// Purpose: Ground model prompts and validate generated records.
// Dependencies: crate::tree, jsonschema, serde_json
// ============================================================================

//! ## Overview
//! Three pure derivations over a field forest:
//! - [`render_blueprint`]: an indented outline, one line per field.
//! - [`build_skeleton`]: an illustrative JSON object with example values.
//! - [`build_record_schema`]: a JSON Schema describing one generated record.
//!
//! All three preserve input order and are deterministic. The record schema is
//! permissive about extra keys: models tend to add helpful context fields, and
//! those are kept rather than rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::tree::FieldNode;
use crate::tree::FieldType;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Indentation added per nesting level in the blueprint.
const BLUEPRINT_INDENT: &str = "  ";
/// Example value used for strings without a description.
pub const SAMPLE_STRING: &str = "sample string";
/// Example value used for numbers.
pub const SAMPLE_NUMBER: u64 = 42;

// ============================================================================
// SECTION: Blueprint
// ============================================================================

/// Renders the forest as an indented outline.
///
/// Each line reads `- name (type)` with ` — description` appended when the
/// description is non-empty. Children follow their parent, indented by two
/// spaces per level.
#[must_use]
pub fn render_blueprint(fields: &[FieldNode]) -> String {
    let mut lines = Vec::new();
    push_blueprint_lines(fields, 0, &mut lines);
    lines.join("\n")
}

/// Appends blueprint lines for `fields` at the given depth.
fn push_blueprint_lines(fields: &[FieldNode], depth: usize, lines: &mut Vec<String>) {
    for field in fields {
        let indent = BLUEPRINT_INDENT.repeat(depth);
        let mut line = format!("{indent}- {} ({})", field.name, field.field_type);
        if let Some(description) = field.description() {
            line.push_str(" — ");
            line.push_str(description);
        }
        lines.push(line);
        push_blueprint_lines(&field.children, depth + 1, lines);
    }
}

// ============================================================================
// SECTION: Skeleton
// ============================================================================

/// Builds an illustrative JSON object mirroring the forest.
///
/// The skeleton anchors the model's output shape; it is never used to
/// validate anything.
#[must_use]
pub fn build_skeleton(fields: &[FieldNode]) -> Value {
    let mut shape = Map::new();
    for field in fields {
        shape.insert(field.name.clone(), build_example(field));
    }
    Value::Object(shape)
}

/// Returns the representative example value for a single field.
#[must_use]
pub fn build_example(field: &FieldNode) -> Value {
    match field.field_type {
        FieldType::String => {
            Value::String(field.description().unwrap_or(SAMPLE_STRING).to_string())
        }
        FieldType::Number => Value::from(SAMPLE_NUMBER),
        FieldType::Boolean => Value::Bool(true),
        FieldType::Null => Value::Null,
        FieldType::Array => Value::Array(Vec::new()),
        FieldType::Object => build_skeleton(&field.children),
    }
}

// ============================================================================
// SECTION: Record Schema
// ============================================================================

/// Builds the JSON Schema for one generated record.
///
/// Every declared field is required. Extra keys are allowed.
#[must_use]
pub fn build_record_schema(fields: &[FieldNode]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in fields {
        if !properties.contains_key(&field.name) {
            required.push(Value::String(field.name.clone()));
        }
        properties.insert(field.name.clone(), build_field_schema(field));
    }
    json!({
        "type": "object",
        "properties": Value::Object(properties),
        "required": required,
        "additionalProperties": true,
    })
}

/// Builds the schema for a single field value.
#[must_use]
pub fn build_field_schema(field: &FieldNode) -> Value {
    match field.field_type {
        FieldType::String => json!({"type": "string"}),
        FieldType::Number => json!({"type": "number"}),
        FieldType::Boolean => json!({"type": "boolean"}),
        FieldType::Null => json!({"type": "null"}),
        FieldType::Array if field.children.is_empty() => json!({"type": "array"}),
        FieldType::Array => json!({
            "type": "array",
            "items": build_record_schema(&field.children),
        }),
        FieldType::Object => build_record_schema(&field.children),
    }
}

// ============================================================================
// SECTION: Record Validation
// ============================================================================

/// Schema compilation errors.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The generated schema could not be compiled.
    #[error("invalid schema: {0}")]
    Invalid(String),
}

/// Compiled validator for generated records.
pub struct RecordValidator {
    /// Compiled record schema.
    validator: Validator,
}

impl RecordValidator {
    /// Compiles the record schema for a forest.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the schema cannot be compiled.
    pub fn new(fields: &[FieldNode]) -> Result<Self, SchemaError> {
        Self::from_schema(&build_record_schema(fields))
    }

    /// Compiles an already-built record schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the schema cannot be compiled.
    pub fn from_schema(schema: &Value) -> Result<Self, SchemaError> {
        Ok(Self {
            validator: compile_schema(schema)?,
        })
    }

    /// Returns true when the record conforms to the schema.
    #[must_use]
    pub fn is_valid(&self, record: &Value) -> bool {
        self.validator.is_valid(record)
    }

    /// Returns human-readable violations for the record.
    #[must_use]
    pub fn violations(&self, record: &Value) -> Vec<String> {
        self.validator.iter_errors(record).map(|err| err.to_string()).collect()
    }
}

/// Compiles a JSON Schema (draft 2020-12).
pub(crate) fn compile_schema(schema: &Value) -> Result<Validator, SchemaError> {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .map_err(|err| SchemaError::Invalid(err.to_string()))
}
