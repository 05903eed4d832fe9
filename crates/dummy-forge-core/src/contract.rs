// crates/dummy-forge-core/src/contract.rs
// ============================================================================
// Module: Response Contract
// Description: Success and failure bodies returned to API callers.
// Purpose: Keep the wire contract stable and independent of backends.
// Dependencies: crate::{payload, response}, serde
// ============================================================================

//! ## Overview
//! Wire types for `POST /api/dummy`. Field names are camelCase on the wire.
//! A fresh [`GenerationResult`] is built per request and handed to the caller.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::payload::ValidationDetails;
use crate::response::GeneratedSamples;

/// Successful generation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Always `true` for this body.
    pub success: bool,
    /// Summary written by the model.
    pub message: String,
    /// RFC 3339 submission timestamp.
    pub submitted_at: String,
    /// Provider display label.
    pub model: String,
    /// Field and variation totals.
    pub totals: GenerationTotals,
    /// Generated record sets.
    pub data: GenerationData,
    /// Validation notes written by the model.
    pub notes: Vec<String>,
}

impl GenerationResult {
    /// Builds a success body from generated samples.
    #[must_use]
    pub fn new(
        samples: GeneratedSamples,
        model_label: impl Into<String>,
        total_fields: usize,
        submitted_at: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            message: samples.summary,
            submitted_at: submitted_at.into(),
            model: model_label.into(),
            totals: GenerationTotals {
                fields: total_fields,
                variations: samples.variations.len() + 1,
            },
            data: GenerationData {
                primary: samples.primary,
                variations: samples.variations,
            },
            notes: samples.notes,
        }
    }
}

/// Totals reported alongside generated data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationTotals {
    /// Field count, children included.
    pub fields: usize,
    /// Number of returned sets, primary included.
    pub variations: usize,
}

/// Generated record sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationData {
    /// Primary record set.
    pub primary: Vec<Value>,
    /// Alternate record sets.
    pub variations: Vec<Vec<Value>>,
}

/// Failure body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
    /// Structured validation details when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ValidationDetails>,
}

impl ErrorBody {
    /// Builds a failure body without details.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// Attaches validation details.
    #[must_use]
    pub fn with_details(mut self, details: ValidationDetails) -> Self {
        self.details = Some(details);
        self
    }
}
