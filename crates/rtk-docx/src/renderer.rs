//! Rendering engine boundary.
//!
//! The actual template engine is external. It receives the raw template
//! bytes and a JSON-shaped context mapping and returns the rendered bytes,
//! or fails on malformed templates and unresolvable expressions. No retries;
//! a failure here is terminal for the request.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Malformed DOCX template: {0}")]
    InvalidTemplate(String),

    #[error("Unresolvable template expression: {0}")]
    UnresolvedExpression(String),

    #[error("Rendering failed: {0}")]
    Other(String),
}

/// `render(template_bytes, context) -> bytes`.
///
/// Implementations are expected to be side-effect-free and deterministic for
/// a given template/context pair.
pub trait DocxRenderer: Send + Sync {
    /// # Errors
    ///
    /// Returns `RenderError` if the template is malformed or the context does
    /// not satisfy the template's expressions.
    fn render(&self, template: &[u8], context: &Map<String, Value>)
    -> Result<Vec<u8>, RenderError>;
}
