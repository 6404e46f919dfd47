//! # rtk-core
//!
//! Core types, ID helpers, and metadata validation for Risktool.
//!
//! This crate provides the foundational types shared across all Risktool crates:
//! - Entity structs for all domain objects (question pools, studies, assessments,
//!   metadata templates)
//! - Field-type and status enums
//! - ID prefix constants and format validation
//! - The metadata template validator (field-definition consistency and
//!   value-against-template checks)

pub mod entities;
pub mod enums;
pub mod ids;
pub mod metadata;
