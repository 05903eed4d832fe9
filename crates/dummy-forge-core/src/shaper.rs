// crates/dummy-forge-core/src/shaper.rs
// ============================================================================
// Module: Request Shaper
// Description: Bounded generation plans derived from validated requests.
// Purpose: Produce the prompt and response schema sent to a generative model.
// Dependencies: crate::{limits, payload, transforms, tree}, serde_json
// ============================================================================

//! ## Overview
//! [`shape_request`] converts a validated [`GenerationRequest`] into a
//! [`GenerationPlan`]: clamped counts, the blueprint, the skeleton, the record
//! schema, the composite response schema, and the instruction text.
//!
//! Sample and record counts are clamped to their ceilings. The field count is
//! rejected outright when it exceeds [`MAX_FIELDS`]. The prompt repeats the
//! exact counts because backends only enforce them structurally.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::limits::MAX_FIELDS;
use crate::limits::MAX_RECORDS_PER_SAMPLE;
use crate::limits::MAX_SAMPLES;
use crate::limits::MAX_VALIDATION_NOTES;
use crate::limits::clamp_count;
use crate::payload::GenerationRequest;
use crate::payload::ModelKey;
use crate::transforms::build_record_schema;
use crate::transforms::build_skeleton;
use crate::transforms::render_blueprint;
use crate::tree::FieldNode;
use crate::tree::count_fields;

// ============================================================================
// SECTION: Response Keys
// ============================================================================

/// Response property holding the primary record set.
pub const PRIMARY_KEY: &str = "primaryRecord";
/// Response property holding the alternate record sets.
pub const ALTERNATES_KEY: &str = "alternateSamples";
/// Response property holding the summary text.
pub const SUMMARY_KEY: &str = "summary";
/// Response property holding validation notes.
pub const NOTES_KEY: &str = "validationNotes";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Request shaping errors.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// The forest exceeds the field ceiling.
    #[error("Payload exceeds the maximum of {max} fields.")]
    FieldLimit {
        /// Ceiling that was breached.
        max: usize,
        /// Actual field count.
        actual: usize,
    },
    /// The skeleton could not be rendered.
    #[error("failed to render skeleton: {0}")]
    Serialization(String),
}

// ============================================================================
// SECTION: Generation Plan
// ============================================================================

/// Fully derived, bounded generation request.
///
/// # Invariants
/// - `1 <= samples <= MAX_SAMPLES` and `alternate_samples == samples - 1`.
/// - `1 <= records_per_sample <= MAX_RECORDS_PER_SAMPLE`.
/// - `total_fields <= MAX_FIELDS`.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationPlan {
    /// Selected model key.
    pub model: ModelKey,
    /// Total field count, children included.
    pub total_fields: usize,
    /// Clamped number of sample sets.
    pub samples: usize,
    /// Number of alternate sample sets.
    pub alternate_samples: usize,
    /// Clamped number of records per set.
    pub records_per_sample: usize,
    /// Indented field outline.
    pub blueprint: String,
    /// Illustrative example object.
    pub skeleton: Value,
    /// Schema for one record.
    pub record_schema: Value,
    /// Schema for the full model response.
    pub response_schema: Value,
    /// Instruction text sent to the model.
    pub prompt: String,
}

/// Rejects forests above the field ceiling and returns the field count.
///
/// # Errors
///
/// Returns [`ShapeError::FieldLimit`] when the count exceeds [`MAX_FIELDS`].
pub fn enforce_field_limit(fields: &[FieldNode]) -> Result<usize, ShapeError> {
    let actual = count_fields(fields);
    if actual > MAX_FIELDS {
        return Err(ShapeError::FieldLimit {
            max: MAX_FIELDS,
            actual,
        });
    }
    Ok(actual)
}

/// Shapes a validated request into a bounded generation plan.
///
/// # Errors
///
/// Returns [`ShapeError`] when the field ceiling is exceeded or the skeleton
/// cannot be rendered.
pub fn shape_request(request: &GenerationRequest) -> Result<GenerationPlan, ShapeError> {
    let total_fields = enforce_field_limit(&request.fields)?;
    let samples = clamp_count(request.samples, MAX_SAMPLES).max(1);
    let alternate_samples = samples - 1;
    let records_per_sample = clamp_count(request.records_per_sample, MAX_RECORDS_PER_SAMPLE).max(1);

    let blueprint = render_blueprint(&request.fields);
    let skeleton = build_skeleton(&request.fields);
    let record_schema = build_record_schema(&request.fields);
    let response_schema =
        build_response_schema(&record_schema, records_per_sample, alternate_samples);
    let skeleton_text = serde_json::to_string_pretty(&skeleton)
        .map_err(|err| ShapeError::Serialization(err.to_string()))?;
    let prompt = build_prompt(&blueprint, &skeleton_text, samples, records_per_sample);

    Ok(GenerationPlan {
        model: request.model,
        total_fields,
        samples,
        alternate_samples,
        records_per_sample,
        blueprint,
        skeleton,
        record_schema,
        response_schema,
        prompt,
    })
}

// ============================================================================
// SECTION: Response Schema
// ============================================================================

/// Builds the composite response schema.
///
/// The response must hold exactly one primary set and exactly
/// `alternate_samples` alternate sets, each with exactly `records_per_sample`
/// records, plus a summary and at most [`MAX_VALIDATION_NOTES`] notes.
#[must_use]
pub fn build_response_schema(
    record_schema: &Value,
    records_per_sample: usize,
    alternate_samples: usize,
) -> Value {
    let record_set = json!({
        "type": "array",
        "items": record_schema,
        "minItems": records_per_sample,
        "maxItems": records_per_sample,
    });
    json!({
        "type": "object",
        "properties": {
            PRIMARY_KEY: record_set,
            ALTERNATES_KEY: {
                "type": "array",
                "items": record_set,
                "minItems": alternate_samples,
                "maxItems": alternate_samples,
            },
            SUMMARY_KEY: {"type": "string"},
            NOTES_KEY: {
                "type": "array",
                "items": {"type": "string"},
                "maxItems": MAX_VALIDATION_NOTES,
            },
        },
        "required": [PRIMARY_KEY, ALTERNATES_KEY, SUMMARY_KEY, NOTES_KEY],
    })
}

// ============================================================================
// SECTION: Prompt
// ============================================================================

/// Builds the instruction text for the model.
#[must_use]
pub fn build_prompt(
    blueprint: &str,
    skeleton_text: &str,
    samples: usize,
    records_per_sample: usize,
) -> String {
    let alternates = samples.saturating_sub(1);
    let alternate_clause = if alternates > 0 {
        format!(" and {alternates} alternate sample{}", plural(alternates))
    } else {
        String::new()
    };
    let paragraphs = [
        "You are a senior QA engineer tasked with crafting realistic dummy JSON data for \
         automated tests."
            .to_string(),
        "Use the following field blueprint. Respect names, data types, and hierarchy:".to_string(),
        blueprint.to_string(),
        "Here is a JSON skeleton that illustrates the overall shape. Preserve it exactly, filling \
         in thoughtful sample values:"
            .to_string(),
        skeleton_text.to_string(),
        format!(
            "Generate exactly {samples} total sample{}: 1 primary sample{alternate_clause}.",
            plural(samples)
        ),
        format!(
            "Each sample must contain exactly {records_per_sample} record{} arranged as an array \
             of objects.",
            plural(records_per_sample)
        ),
        "Return JSON that matches the provided schema: one primary array plus the requested \
         alternate sample arrays, along with a short summary and optional validation notes."
            .to_string(),
        "Avoid personally identifiable information, secrets, or offensive content.".to_string(),
    ];
    paragraphs.join("\n\n")
}

/// Returns the plural suffix for a count.
const fn plural(count: usize) -> &'static str {
    if count > 1 { "s" } else { "" }
}
