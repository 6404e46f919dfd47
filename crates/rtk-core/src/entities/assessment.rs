use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::AssessmentStatus;

/// A per-study answer set: question id to free-text answer.
///
/// `answers` is a `BTreeMap` so serialized representations (and the DOCX
/// binding contexts built from them) are deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub study_id: String,
    pub name: String,
    pub progress: i64,
    pub total_questions: i64,
    pub answered_questions: i64,
    pub status: AssessmentStatus,
    pub answers: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Constructor payload for an assessment; the store assigns id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentCreate {
    pub study_id: String,
    pub name: String,
    pub progress: i64,
    pub total_questions: i64,
    pub answered_questions: i64,
    pub status: AssessmentStatus,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
}
