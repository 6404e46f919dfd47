//! # rtk-docx
//!
//! Turns an assessment into a populated DOCX report: builds the answer
//! binding context from the assessment, its study, and the study's question
//! pool, then hands the pool's uploaded template plus the context to a
//! [`renderer::DocxRenderer`].
//!
//! The rendering engine itself is an external collaborator behind the
//! [`renderer::DocxRenderer`] trait; this crate owns everything up to the
//! `render(template_bytes, context)` call.

pub mod binder;
pub mod error;
pub mod population;
pub mod renderer;

pub use error::DocxError;
pub use population::{AssessmentDocxService, PopulatedDocx};
pub use renderer::{DocxRenderer, RenderError};
