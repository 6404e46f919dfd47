use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::MetadataFieldType;

/// One typed, constrained field in a metadata template.
///
/// `min`/`max` bound the string length for text kinds and the numeric range
/// for numbers. `options` is mandatory for select/multiselect. `regex`
/// constrains text kinds and must match the entire value.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetadataFieldDef {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: MetadataFieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

/// A versioned, named list of typed field constraints used to validate
/// free-form study metadata.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetadataTemplate {
    pub id: String,
    pub name: String,
    pub version: i64,
    pub fields: Vec<MetadataFieldDef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Constructor payload for a metadata template; the store assigns id and
/// timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetadataTemplateCreate {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: i64,
    #[serde(default)]
    pub fields: Vec<MetadataFieldDef>,
}

const fn default_version() -> i64 {
    1
}
