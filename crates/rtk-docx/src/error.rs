//! Population pipeline errors.

use thiserror::Error;

use rtk_db::error::DatabaseError;

use crate::renderer::RenderError;

/// Failures while assembling or rendering a populated report.
///
/// The four precondition variants are checked in order (assessment, study,
/// pool, attachment) so a caller always learns about the first missing link
/// in the chain. A malformed reference id is folded into the same "not found"
/// outcome as a well-formed id that matches nothing.
#[derive(Debug, Error)]
pub enum DocxError {
    #[error("Assessment not found: {id}")]
    AssessmentNotFound { id: String },

    #[error("Study not found: {id}")]
    StudyNotFound { id: String },

    #[error("Question pool not found: {id}")]
    PoolNotFound { id: String },

    #[error("No DOCX template uploaded for question pool {pool_id}")]
    TemplateNotUploaded { pool_id: String },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Context serialization failed: {0}")]
    Context(#[from] serde_json::Error),

    #[error(transparent)]
    Db(DatabaseError),
}

impl DocxError {
    /// HTTP-equivalent status for boundary layers.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::AssessmentNotFound { .. }
            | Self::StudyNotFound { .. }
            | Self::PoolNotFound { .. }
            | Self::TemplateNotUploaded { .. } => 404,
            Self::Render(_) | Self::Context(_) => 500,
            Self::Db(db) => db.status_code(),
        }
    }
}
