//! Database error types for rtk-db.

use rtk_core::metadata::ValidationError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Entity lookup returned no result.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A caller-supplied id does not match the store's id format.
    #[error("Invalid identifier: {id}")]
    BadIdentifier { id: String },

    /// A DOCX upload broke the upload rules (extension, empty body).
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// Schema or metadata constraint violated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// HTTP-equivalent status class for this failure.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::BadIdentifier { .. } | Self::InvalidUpload(_) | Self::Validation(_) => 400,
            Self::Query(_) | Self::Migration(_) | Self::LibSql(_) | Self::Other(_) => 500,
        }
    }
}
