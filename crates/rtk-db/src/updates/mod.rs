//! Partial-update builders.
//!
//! Every update is a non-destructive merge: `None` fields never touch their
//! columns. Fields that can be explicitly cleared (set to SQL NULL) use
//! `Option<Option<T>>`, where `Some(None)` means "clear".

pub mod assessment;
pub mod metadata_template;
pub mod question_pool;
pub mod study;
