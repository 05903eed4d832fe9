// crates/dummy-forge-core/src/limits.rs
// ============================================================================
// Module: Generation Limits
// Description: Hard ceilings for field count, samples, and records.
// Purpose: Keep prompt size and generation cost bounded.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Sample and record counts above their ceilings are clamped; the field count
//! ceiling is enforced by rejection because exceeding it changes what the
//! model is asked to produce.

/// Maximum number of field nodes in a forest, counted recursively.
pub const MAX_FIELDS: usize = 60;
/// Maximum number of sample sets (primary plus alternates).
pub const MAX_SAMPLES: usize = 5;
/// Maximum number of records in each sample set.
pub const MAX_RECORDS_PER_SAMPLE: usize = 50;
/// Maximum number of validation notes accepted from the model.
pub const MAX_VALIDATION_NOTES: usize = 5;

/// Clamps a requested count down to `max`.
#[must_use]
pub fn clamp_count(requested: u64, max: usize) -> usize {
    usize::try_from(requested).map_or(max, |value| value.min(max))
}
