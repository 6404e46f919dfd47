//! Assessment update builder.

use std::collections::BTreeMap;

use rtk_core::enums::AssessmentStatus;

#[derive(Debug, Clone, Default)]
pub struct AssessmentUpdate {
    pub name: Option<String>,
    pub progress: Option<i64>,
    pub total_questions: Option<i64>,
    pub answered_questions: Option<i64>,
    pub status: Option<AssessmentStatus>,
    pub answers: Option<BTreeMap<String, String>>,
}

pub struct AssessmentUpdateBuilder(AssessmentUpdate);

impl AssessmentUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(AssessmentUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn progress(mut self, progress: i64) -> Self {
        self.0.progress = Some(progress);
        self
    }

    #[must_use]
    pub const fn total_questions(mut self, total: i64) -> Self {
        self.0.total_questions = Some(total);
        self
    }

    #[must_use]
    pub const fn answered_questions(mut self, answered: i64) -> Self {
        self.0.answered_questions = Some(answered);
        self
    }

    #[must_use]
    pub const fn status(mut self, status: AssessmentStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn answers(mut self, answers: BTreeMap<String, String>) -> Self {
        self.0.answers = Some(answers);
        self
    }

    #[must_use]
    pub fn build(self) -> AssessmentUpdate {
        self.0
    }
}

impl Default for AssessmentUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
