// crates/dummy-forge-core/src/tree.rs
// ============================================================================
// Module: Field Tree Model
// Description: Recursive field nodes describing a desired JSON shape.
// Purpose: Provide the canonical tree unit consumed by every transform.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A field forest is an ordered list of [`FieldNode`] roots. Each node names a
//! key, declares a [`FieldType`], and may carry children. Children are only
//! meaningful for `object` and `array` nodes; for arrays they describe the
//! shape of a single element object.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Field Types
// ============================================================================

/// JSON type assigned to a field node.
///
/// # Invariants
/// - Variants are stable and serialize to their lowercase JSON type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON object described by the node's children.
    Object,
    /// JSON array whose elements are described by the node's children.
    Array,
    /// JSON boolean.
    Boolean,
    /// JSON null.
    Null,
}

impl FieldType {
    /// All field types in their canonical order.
    pub const ALL: [Self; 6] =
        [Self::String, Self::Number, Self::Object, Self::Array, Self::Boolean, Self::Null];

    /// Returns the stable JSON type label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Object => "object",
            Self::Array => "array",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }

    /// Parses a JSON type label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == label)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Field Node
// ============================================================================

/// One node of the user-authored field tree.
///
/// # Invariants
/// - `name` is non-empty once the node passed payload validation.
/// - `id` and `value` never influence generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNode {
    /// Opaque identifier used by the UI for reconciliation.
    pub id: String,
    /// Object key produced for this field.
    pub name: String,
    /// Declared JSON type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Cosmetic placeholder shown by the UI.
    pub value: String,
    /// Free-text guidance for the model.
    #[serde(default)]
    pub description: String,
    /// Ordered child fields.
    #[serde(default)]
    pub children: Vec<Self>,
}

impl FieldNode {
    /// Creates a leaf node with empty id, value, and description.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            field_type,
            value: String::new(),
            description: String::new(),
            children: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }

    /// Returns the description when it is non-empty.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        if self.description.is_empty() { None } else { Some(self.description.as_str()) }
    }
}

// ============================================================================
// SECTION: Traversal
// ============================================================================

/// Counts every node in the forest, children included.
#[must_use]
pub fn count_fields(fields: &[FieldNode]) -> usize {
    fields.iter().map(|field| 1 + count_fields(&field.children)).sum()
}
