//! Field-type and status enums for Risktool.
//!
//! Serialized representations match the wire format: field types are lowercase
//! single words, assessment statuses are kebab-case.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// MetadataFieldType
// ---------------------------------------------------------------------------

/// The closed set of field kinds a metadata template may declare.
///
/// Deserialization rejects any other tag, so an "unsupported field type" is
/// unrepresentable past the parsing boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MetadataFieldType {
    Text,
    Textarea,
    Number,
    Date,
    Select,
    Multiselect,
    Boolean,
}

impl MetadataFieldType {
    /// Return the string representation used in serialized templates.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Date => "date",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Boolean => "boolean",
        }
    }

    /// Whether this field kind requires an `options` list on its definition.
    #[must_use]
    pub const fn requires_options(self) -> bool {
        matches!(self, Self::Select | Self::Multiselect)
    }
}

impl fmt::Display for MetadataFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AssessmentStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AssessmentStatus {
    InProgress,
    Completed,
}

impl AssessmentStatus {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
