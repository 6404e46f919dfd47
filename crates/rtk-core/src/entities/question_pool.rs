use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One survey/audit question inside a pool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub identifier: String,
    pub text: String,
    pub domain: String,
    pub risk_type: String,
    pub iso_reference: String,
}

/// Metadata about an uploaded DOCX template. The binary payload is stored
/// separately and never appears on the structured pool representation; it is
/// retrievable only through the dedicated download operation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocxFileMeta {
    pub filename: String,
    pub content_type: String,
    pub size: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// A named set of questions, optionally carrying an uploaded DOCX template.
///
/// `question_count` is derived: it always equals `questions.len()` and is
/// recomputed by the store on every write that touches `questions`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPool {
    pub id: String,
    pub name: String,
    pub source: String,
    pub questions: Vec<Question>,
    pub question_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docx_file: Option<DocxFileMeta>,
}

/// Constructor payload for a question pool. There is deliberately no
/// `question_count` field: the count is never client-supplied.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPoolCreate {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}
