use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entities::MetadataFieldDef;

/// A research study referencing a question pool, with free-form metadata
/// validated against an optional metadata template.
///
/// `metadata_template_snapshot` is a frozen copy of the template's fields
/// taken the last time `metadata` was validated, so later template edits do
/// not change how this study's metadata is interpreted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    pub id: String,
    pub name: String,
    pub phase: String,
    pub therapeutic_area: String,
    pub study_question: String,
    pub pool_id: String,
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_template_id: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_template_snapshot: Option<Vec<MetadataFieldDef>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Constructor payload for a study; `owner_id`, id, timestamps, and the
/// metadata snapshot are server-assigned.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudyCreate {
    pub name: String,
    pub phase: String,
    pub therapeutic_area: String,
    pub study_question: String,
    pub pool_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_template_id: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}
