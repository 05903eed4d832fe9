// crates/dummy-forge-core/src/lib.rs
// ============================================================================
// Module: Dummy Forge Core Library
// Description: Public API surface for the schema-to-generation pipeline.
// Purpose: Expose the field tree model, transforms, and request shaping.
// Dependencies: crate::{tree, transforms, payload, shaper, response, contract}
// ============================================================================

//! ## Overview
//! Dummy Forge core turns a user-authored field tree into the artifacts needed
//! to ask a generative model for sample JSON records: a textual blueprint, an
//! illustrative skeleton, a record schema, and a bounded generation plan. It
//! also validates the model's structured response and shapes it into the
//! stable response contract. Everything here is synchronous and pure; network
//! access lives in `dummy-forge-providers`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod contract;
pub mod limits;
pub mod payload;
pub mod response;
pub mod shaper;
pub mod transforms;
pub mod tree;

#[cfg(test)]
mod tests;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use contract::ErrorBody;
pub use contract::GenerationData;
pub use contract::GenerationResult;
pub use contract::GenerationTotals;
pub use limits::MAX_FIELDS;
pub use limits::MAX_RECORDS_PER_SAMPLE;
pub use limits::MAX_SAMPLES;
pub use limits::MAX_VALIDATION_NOTES;
pub use payload::GenerationRequest;
pub use payload::ModelKey;
pub use payload::PayloadError;
pub use payload::ValidationDetails;
pub use payload::parse_generation_request;
pub use payload::parse_json_body;
pub use payload::validate_fields;
pub use payload::validate_payload;
pub use response::GeneratedSamples;
pub use response::ResponseError;
pub use response::ResponseValidator;
pub use response::coerce_record_sets;
pub use response::finalize_response;
pub use response::repair_response;
pub use shaper::GenerationPlan;
pub use shaper::ShapeError;
pub use shaper::build_prompt;
pub use shaper::build_response_schema;
pub use shaper::enforce_field_limit;
pub use shaper::shape_request;
pub use transforms::RecordValidator;
pub use transforms::SchemaError;
pub use transforms::build_record_schema;
pub use transforms::build_skeleton;
pub use transforms::render_blueprint;
pub use tree::FieldNode;
pub use tree::FieldType;
pub use tree::count_fields;
