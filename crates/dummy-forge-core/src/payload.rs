// crates/dummy-forge-core/src/payload.rs
// ============================================================================
// Module: Generation Payload
// Description: Parsing and contract validation for generation requests.
// Purpose: Turn untrusted request bytes into a typed generation request.
// Dependencies: crate::tree, serde, serde_json
// ============================================================================

//! ## Overview
//! Request handling starts here. Bytes are parsed as JSON first; a parse
//! failure is reported as [`PayloadError::Malformed`] before any validation
//! runs. The parsed value is then walked by hand so that every contract
//! violation is collected into [`ValidationDetails`] instead of stopping at
//! the first one. Paths use dotted notation (`fields.0.children.1.name`).
//!
//! Counts below one are rejected here. Counts above their ceilings pass
//! through unchanged and are clamped by the request shaper.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::tree::FieldNode;
use crate::tree::FieldType;

// ============================================================================
// SECTION: Model Keys
// ============================================================================

/// Logical model selector submitted by the client.
///
/// # Invariants
/// - The set is closed; adding a provider means adding a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelKey {
    /// GPT-family backend.
    #[serde(rename = "chatgpt")]
    ChatGpt,
    /// Gemini-family backend.
    #[serde(rename = "gemini")]
    Gemini,
}

impl ModelKey {
    /// All supported model keys.
    pub const ALL: [Self; 2] = [Self::ChatGpt, Self::Gemini];

    /// Returns the wire label for the key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChatGpt => "chatgpt",
            Self::Gemini => "gemini",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == label)
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Request Types
// ============================================================================

/// Validated generation request.
///
/// # Invariants
/// - `samples` and `records_per_sample` are at least one; they are not yet
///   clamped to their ceilings.
/// - Field names are non-empty and unique among siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Selected model key.
    pub model: ModelKey,
    /// Requested number of sample sets.
    pub samples: u64,
    /// Requested number of records per sample set.
    pub records_per_sample: u64,
    /// Field forest describing one record.
    pub fields: Vec<FieldNode>,
}

/// Structured validation failures.
///
/// Serializes as `{ "formErrors": [...], "fieldErrors": { path: [...] } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationDetails {
    /// Errors that apply to the payload as a whole.
    pub form_errors: Vec<String>,
    /// Errors keyed by dotted field path.
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationDetails {
    /// Returns true when no violations were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// Records a violation for a field path.
    pub fn push_field(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.field_errors.entry(path.into()).or_default().push(message.into());
    }

    /// Records a payload-level violation.
    pub fn push_form(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Payload parsing and validation errors.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Body is not parseable JSON.
    #[error("Unable to parse JSON payload.")]
    Malformed,
    /// Body parsed but violates the payload contract.
    #[error("The request payload is invalid or incomplete.")]
    Invalid(ValidationDetails),
}

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Parses raw bytes as JSON.
///
/// # Errors
///
/// Returns [`PayloadError::Malformed`] when the bytes are not valid JSON.
pub fn parse_json_body(bytes: &[u8]) -> Result<Value, PayloadError> {
    serde_json::from_slice(bytes).map_err(|_| PayloadError::Malformed)
}

/// Parses and validates a generation request body.
///
/// # Errors
///
/// Returns [`PayloadError`] when parsing or validation fails.
pub fn parse_generation_request(bytes: &[u8]) -> Result<GenerationRequest, PayloadError> {
    let value = parse_json_body(bytes)?;
    validate_payload(&value)
}

/// Validates a parsed payload against the request contract.
///
/// # Errors
///
/// Returns [`PayloadError::Invalid`] with every violation found.
pub fn validate_payload(value: &Value) -> Result<GenerationRequest, PayloadError> {
    let mut validator = PayloadValidator::default();
    let Value::Object(map) = value else {
        validator.details.push_form(format!("Expected object, received {}", value_kind(value)));
        return Err(PayloadError::Invalid(validator.details));
    };
    let model = validator.model(map.get("model"));
    let samples = validator.count("samples", map.get("samples"), "At least one sample is required");
    let records_per_sample = validator.count(
        "recordsPerSample",
        map.get("recordsPerSample"),
        "At least one record per sample is required",
    );
    let fields = validator.root_fields(map.get("fields"));
    match (model, samples, records_per_sample, fields) {
        (Some(model), Some(samples), Some(records_per_sample), Some(fields))
            if validator.details.is_empty() =>
        {
            Ok(GenerationRequest {
                model,
                samples,
                records_per_sample,
                fields,
            })
        }
        _ => Err(PayloadError::Invalid(validator.details)),
    }
}

/// Validates a bare field forest (a JSON array of field nodes).
///
/// # Errors
///
/// Returns [`PayloadError::Invalid`] with every violation found.
pub fn validate_fields(value: &Value) -> Result<Vec<FieldNode>, PayloadError> {
    let mut validator = PayloadValidator::default();
    let fields = validator.root_fields(Some(value));
    match fields {
        Some(fields) if validator.details.is_empty() => Ok(fields),
        _ => Err(PayloadError::Invalid(validator.details)),
    }
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Accumulates violations while walking an untrusted payload.
#[derive(Default)]
struct PayloadValidator {
    /// Collected violations.
    details: ValidationDetails,
}

impl PayloadValidator {
    /// Validates the `model` selector.
    fn model(&mut self, value: Option<&Value>) -> Option<ModelKey> {
        match value {
            None => {
                self.details.push_field("model", "Required");
                None
            }
            Some(Value::String(label)) => {
                let key = ModelKey::parse(label);
                if key.is_none() {
                    self.details.push_field(
                        "model",
                        format!(
                            "Invalid enum value. Expected {}, received '{label}'",
                            expected_labels(ModelKey::ALL.iter().map(|key| key.as_str()))
                        ),
                    );
                }
                key
            }
            Some(other) => {
                self.details
                    .push_field("model", format!("Expected string, received {}", value_kind(other)));
                None
            }
        }
    }

    /// Validates a positive integer count.
    fn count(&mut self, path: &str, value: Option<&Value>, below_min: &str) -> Option<u64> {
        let Some(value) = value else {
            self.details.push_field(path, "Required");
            return None;
        };
        if let Some(count) = value.as_u64() {
            if count == 0 {
                self.details.push_field(path, below_min);
                return None;
            }
            return Some(count);
        }
        if value.is_i64() {
            self.details.push_field(path, below_min);
        } else if let Some(number) = value.as_f64() {
            match integral_count(number) {
                Some(count) if count >= 1 => return Some(count),
                Some(_) => self.details.push_field(path, below_min),
                None => self.details.push_field(path, "Expected integer, received float"),
            }
        } else {
            self.details
                .push_field(path, format!("Expected number, received {}", value_kind(value)));
        }
        None
    }

    /// Validates the root `fields` forest, which must be non-empty.
    fn root_fields(&mut self, value: Option<&Value>) -> Option<Vec<FieldNode>> {
        match value {
            None => {
                self.details.push_field("fields", "Required");
                None
            }
            Some(Value::Array(items)) if items.is_empty() => {
                self.details.push_field("fields", "At least one field is required");
                None
            }
            Some(Value::Array(items)) => self.forest("fields", items),
            Some(other) => {
                self.details
                    .push_field("fields", format!("Expected array, received {}", value_kind(other)));
                None
            }
        }
    }

    /// Validates an ordered list of sibling nodes.
    fn forest(&mut self, path: &str, items: &[Value]) -> Option<Vec<FieldNode>> {
        let mut seen = BTreeSet::new();
        let mut nodes = Vec::with_capacity(items.len());
        let mut complete = true;
        for (index, item) in items.iter().enumerate() {
            let node_path = format!("{path}.{index}");
            if let Some(name) = item.get("name").and_then(Value::as_str)
                && !name.is_empty()
                && !seen.insert(name)
            {
                self.details.push_field(
                    format!("{node_path}.name"),
                    format!("Duplicate field name '{name}' among siblings"),
                );
                complete = false;
            }
            match self.node(&node_path, item) {
                Some(node) => nodes.push(node),
                None => complete = false,
            }
        }
        complete.then_some(nodes)
    }

    /// Validates a single field node and its children.
    fn node(&mut self, path: &str, value: &Value) -> Option<FieldNode> {
        let Value::Object(map) = value else {
            self.details.push_field(path, format!("Expected object, received {}", value_kind(value)));
            return None;
        };
        let id = self.required_string(path, map, "id");
        let name = self.required_string(path, map, "name").and_then(|name| {
            if name.is_empty() {
                self.details.push_field(format!("{path}.name"), "Field name is required");
                None
            } else {
                Some(name)
            }
        });
        let field_type = self.field_type(path, map.get("type"));
        let placeholder = self.required_string(path, map, "value");
        let description = self.optional_string(path, map, "description");
        let children = match map.get("children") {
            None => Some(Vec::new()),
            Some(Value::Array(items)) => self.forest(&format!("{path}.children"), items),
            Some(other) => {
                self.details.push_field(
                    format!("{path}.children"),
                    format!("Expected array, received {}", value_kind(other)),
                );
                None
            }
        };
        Some(FieldNode {
            id: id?,
            name: name?,
            field_type: field_type?,
            value: placeholder?,
            description: description?,
            children: children?,
        })
    }

    /// Validates the `type` label of a node.
    fn field_type(&mut self, path: &str, value: Option<&Value>) -> Option<FieldType> {
        let type_path = format!("{path}.type");
        match value {
            None => {
                self.details.push_field(type_path, "Required");
                None
            }
            Some(Value::String(label)) => {
                let field_type = FieldType::parse(label);
                if field_type.is_none() {
                    self.details.push_field(
                        type_path,
                        format!(
                            "Invalid enum value. Expected {}, received '{label}'",
                            expected_labels(FieldType::ALL.iter().map(|kind| kind.as_str()))
                        ),
                    );
                }
                field_type
            }
            Some(other) => {
                self.details
                    .push_field(type_path, format!("Expected string, received {}", value_kind(other)));
                None
            }
        }
    }

    /// Reads a required string property.
    fn required_string(&mut self, path: &str, map: &Map<String, Value>, key: &str) -> Option<String> {
        match map.get(key) {
            None => {
                self.details.push_field(format!("{path}.{key}"), "Required");
                None
            }
            Some(Value::String(value)) => Some(value.clone()),
            Some(other) => {
                self.details.push_field(
                    format!("{path}.{key}"),
                    format!("Expected string, received {}", value_kind(other)),
                );
                None
            }
        }
    }

    /// Reads an optional string property, defaulting to empty.
    fn optional_string(&mut self, path: &str, map: &Map<String, Value>, key: &str) -> Option<String> {
        match map.get(key) {
            None => Some(String::new()),
            Some(Value::String(value)) => Some(value.clone()),
            Some(other) => {
                self.details.push_field(
                    format!("{path}.{key}"),
                    format!("Expected string, received {}", value_kind(other)),
                );
                None
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns a stable label for a JSON value's kind.
const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Converts an integral JSON float such as `2.0` or `1e30` to a count.
///
/// Returns `None` when the value has a fractional part. Values below one map
/// to zero; values beyond `u64::MAX` saturate.
fn integral_count(number: f64) -> Option<u64> {
    if !number.is_finite() || number.fract().abs() > 0.0 {
        return None;
    }
    if number < 1.0 {
        return Some(0);
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Float-to-integer casts saturate and the value is positive and integral."
    )]
    let count = number as u64;
    Some(count)
}

/// Formats enum labels as `'a' | 'b'`.
fn expected_labels<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    labels.map(|label| format!("'{label}'")).collect::<Vec<_>>().join(" | ")
}
