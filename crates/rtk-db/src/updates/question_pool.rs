//! Question pool update builder.
//!
//! There is no way to set `question_count` from here: the count is derived
//! and recomputed by the repo whenever `questions` is replaced.

use rtk_core::entities::Question;

#[derive(Debug, Clone, Default)]
pub struct QuestionPoolUpdate {
    pub name: Option<String>,
    pub source: Option<String>,
    pub questions: Option<Vec<Question>>,
}

pub struct QuestionPoolUpdateBuilder(QuestionPoolUpdate);

impl QuestionPoolUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(QuestionPoolUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.0.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn questions(mut self, questions: Vec<Question>) -> Self {
        self.0.questions = Some(questions);
        self
    }

    #[must_use]
    pub fn build(self) -> QuestionPoolUpdate {
        self.0
    }
}

impl Default for QuestionPoolUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
