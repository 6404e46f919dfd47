//! Entity structs for all Risktool domain objects.
//!
//! Each entity maps to a table in the libSQL database. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema`, and serialize with camelCase
//! keys to match the persisted wire shapes (`therapeuticArea`, `poolId`,
//! `questionCount`, ...).

mod assessment;
mod metadata_template;
mod question_pool;
mod study;

pub use assessment::{Assessment, AssessmentCreate};
pub use metadata_template::{MetadataFieldDef, MetadataTemplate, MetadataTemplateCreate};
pub use question_pool::{DocxFileMeta, Question, QuestionPool, QuestionPoolCreate};
pub use study::{Study, StudyCreate};
