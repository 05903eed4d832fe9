// crates/dummy-forge-core/src/response.rs
// ============================================================================
// Module: Model Response Handling
// Description: Repair, validation, and coercion of structured model output.
// Purpose: Turn a backend's structured object into generated sample sets.
// Dependencies: crate::{limits, shaper, transforms}, jsonschema, serde_json
// ============================================================================

//! ## Overview
//! Backends return a JSON object that should match the plan's response schema.
//! Handling runs in three steps:
//! 1. [`repair_response`] fills optional members the schema requires but a
//!    model may omit (empty alternates when none were requested, empty notes).
//! 2. [`ResponseValidator`] checks the repaired object against the schema.
//! 3. [`coerce_record_sets`] extracts the record sets, treating anything that
//!    is not an array as empty.

// ============================================================================
// SECTION: Imports
// ============================================================================

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

use crate::limits::MAX_VALIDATION_NOTES;
use crate::shaper::ALTERNATES_KEY;
use crate::shaper::GenerationPlan;
use crate::shaper::NOTES_KEY;
use crate::shaper::PRIMARY_KEY;
use crate::shaper::SUMMARY_KEY;
use crate::transforms::SchemaError;
use crate::transforms::compile_schema;

/// Maximum number of schema violations quoted in an error message.
const MAX_REPORTED_VIOLATIONS: usize = 5;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Response handling errors.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The response schema could not be compiled.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// The model response is not a JSON object.
    #[error("model response is not a JSON object")]
    NotAnObject,
    /// The model response violates the response schema.
    #[error("model response does not match the requested schema: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),
}

// ============================================================================
// SECTION: Generated Samples
// ============================================================================

/// Record sets and commentary extracted from a model response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedSamples {
    /// Primary record set.
    pub primary: Vec<Value>,
    /// Alternate record sets.
    pub variations: Vec<Vec<Value>>,
    /// Short summary written by the model.
    pub summary: String,
    /// Validation notes written by the model.
    pub notes: Vec<String>,
}

// ============================================================================
// SECTION: Repair
// ============================================================================

/// Fills optional response members a model may leave out.
///
/// A missing alternates array becomes `[]` only when no alternates were
/// requested; missing notes always become `[]`.
#[must_use]
pub fn repair_response(mut raw: Value, plan: &GenerationPlan) -> Value {
    if let Value::Object(map) = &mut raw {
        if plan.alternate_samples == 0 && !map.contains_key(ALTERNATES_KEY) {
            map.insert(ALTERNATES_KEY.to_string(), Value::Array(Vec::new()));
        }
        if !map.contains_key(NOTES_KEY) {
            map.insert(NOTES_KEY.to_string(), Value::Array(Vec::new()));
        }
    }
    raw
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Compiled validator for full model responses.
pub struct ResponseValidator {
    /// Compiled response schema.
    validator: Validator,
}

impl ResponseValidator {
    /// Compiles a response schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the schema cannot be compiled.
    pub fn new(response_schema: &Value) -> Result<Self, SchemaError> {
        Ok(Self {
            validator: compile_schema(response_schema)?,
        })
    }

    /// Validates a response object.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError`] when the response is not an object or
    /// violates the schema.
    pub fn validate(&self, response: &Value) -> Result<(), ResponseError> {
        if !response.is_object() {
            return Err(ResponseError::NotAnObject);
        }
        let violations: Vec<String> = self
            .validator
            .iter_errors(response)
            .take(MAX_REPORTED_VIOLATIONS)
            .map(|err| err.to_string())
            .collect();
        if violations.is_empty() { Ok(()) } else { Err(ResponseError::SchemaViolation(violations)) }
    }
}

// ============================================================================
// SECTION: Coercion
// ============================================================================

/// Extracts the primary and alternate record sets from a response.
///
/// This is the single place where backend output is trusted structurally:
/// a member that is not an array yields an empty set instead of an error, so
/// a usable summary and notes are never discarded over a malformed set.
#[must_use]
pub fn coerce_record_sets(response: &Value) -> (Vec<Value>, Vec<Vec<Value>>) {
    let primary = response.get(PRIMARY_KEY).map_or_else(Vec::new, as_sequence);
    let variations = response
        .get(ALTERNATES_KEY)
        .map_or_else(Vec::new, as_sequence)
        .iter()
        .map(as_sequence)
        .collect();
    (primary, variations)
}

/// Returns the array items, or an empty sequence for non-arrays.
fn as_sequence(value: &Value) -> Vec<Value> {
    value.as_array().cloned().unwrap_or_default()
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Repairs, validates, and coerces a raw model response.
///
/// # Errors
///
/// Returns [`ResponseError`] when the response schema cannot be compiled or
/// the repaired response violates it.
pub fn finalize_response(raw: Value, plan: &GenerationPlan) -> Result<GeneratedSamples, ResponseError> {
    let repaired = repair_response(raw, plan);
    let validator = ResponseValidator::new(&plan.response_schema)?;
    validator.validate(&repaired)?;
    let (primary, variations) = coerce_record_sets(&repaired);
    let summary = repaired.get(SUMMARY_KEY).and_then(Value::as_str).unwrap_or_default().to_string();
    let notes = repaired
        .get(NOTES_KEY)
        .and_then(Value::as_array)
        .map(|notes| {
            notes
                .iter()
                .filter_map(Value::as_str)
                .take(MAX_VALIDATION_NOTES)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Ok(GeneratedSamples {
        primary,
        variations,
        summary,
        notes,
    })
}
