//! Study update builder.
//!
//! `metadata_template_id` is `Option<Option<String>>` to distinguish the
//! three cases that drive metadata re-validation: a new id provided
//! (`Some(Some(id))`), the reference explicitly cleared (`Some(None)`), or
//! the field left untouched (`None`).

use serde_json::{Map, Value};

#[derive(Debug, Clone, Default)]
pub struct StudyUpdate {
    pub name: Option<String>,
    pub phase: Option<String>,
    pub therapeutic_area: Option<String>,
    pub study_question: Option<String>,
    pub pool_id: Option<String>,
    pub metadata_template_id: Option<Option<String>>,
    pub metadata: Option<Map<String, Value>>,
}

impl StudyUpdate {
    /// Whether this update touches metadata or the template reference, which
    /// is what triggers re-validation and snapshot refresh.
    #[must_use]
    pub const fn touches_metadata(&self) -> bool {
        self.metadata.is_some() || self.metadata_template_id.is_some()
    }
}

pub struct StudyUpdateBuilder(StudyUpdate);

impl StudyUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(StudyUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn phase(mut self, phase: impl Into<String>) -> Self {
        self.0.phase = Some(phase.into());
        self
    }

    #[must_use]
    pub fn therapeutic_area(mut self, area: impl Into<String>) -> Self {
        self.0.therapeutic_area = Some(area.into());
        self
    }

    #[must_use]
    pub fn study_question(mut self, question: impl Into<String>) -> Self {
        self.0.study_question = Some(question.into());
        self
    }

    #[must_use]
    pub fn pool_id(mut self, pool_id: impl Into<String>) -> Self {
        self.0.pool_id = Some(pool_id.into());
        self
    }

    /// Point the study at a (different) metadata template.
    #[must_use]
    pub fn metadata_template_id(mut self, template_id: impl Into<String>) -> Self {
        self.0.metadata_template_id = Some(Some(template_id.into()));
        self
    }

    /// Explicitly clear the template reference. This also clears the study's
    /// metadata and snapshot on apply.
    #[must_use]
    pub fn clear_metadata_template(mut self) -> Self {
        self.0.metadata_template_id = Some(None);
        self
    }

    #[must_use]
    pub fn metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.0.metadata = Some(metadata);
        self
    }

    #[must_use]
    pub fn build(self) -> StudyUpdate {
        self.0
    }
}

impl Default for StudyUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
