//! Shared test utilities for rtk-db repo tests.

#[cfg(test)]
pub(crate) mod helpers {
    use std::collections::BTreeMap;

    use serde_json::{Map, Value};

    use rtk_core::entities::{
        AssessmentCreate, MetadataFieldDef, Question, QuestionPoolCreate, StudyCreate,
    };
    use rtk_core::enums::{AssessmentStatus, MetadataFieldType};

    use crate::RiskDb;
    use crate::service::RiskService;

    /// Create an in-memory `RiskService` for pure DB tests.
    pub async fn test_service() -> RiskService {
        let db = RiskDb::open_local(":memory:").await.unwrap();
        RiskService::from_db(db)
    }

    /// An optional text field with no extra constraints.
    pub fn text_field(key: &str) -> MetadataFieldDef {
        MetadataFieldDef {
            key: key.to_string(),
            label: key.to_string(),
            field_type: MetadataFieldType::Text,
            required: false,
            options: None,
            min: None,
            max: None,
            regex: None,
            default: None,
        }
    }

    /// A select field keyed `severity` with options low/medium/high.
    pub fn select_severity_field(required: bool) -> MetadataFieldDef {
        MetadataFieldDef {
            key: "severity".to_string(),
            label: "Severity".to_string(),
            field_type: MetadataFieldType::Select,
            required,
            options: Some(vec!["low".into(), "medium".into(), "high".into()]),
            min: None,
            max: None,
            regex: None,
            default: None,
        }
    }

    pub fn question(id: &str, identifier: &str, text: &str) -> Question {
        Question {
            id: id.to_string(),
            identifier: identifier.to_string(),
            text: text.to_string(),
            domain: "Data Integrity".to_string(),
            risk_type: "Operational".to_string(),
            iso_reference: "ISO 14155:2020 6.4".to_string(),
        }
    }

    pub fn sample_questions() -> Vec<Question> {
        vec![
            question("q1", "Consent Records", "Are consent records complete?"),
            question("q2", "Data Transfer", "Is the transfer encrypted?"),
        ]
    }

    pub fn pool_create() -> QuestionPoolCreate {
        QuestionPoolCreate {
            name: "ISO 14155 audit".to_string(),
            source: "import".to_string(),
            questions: sample_questions(),
        }
    }

    pub fn study_create(pool_id: &str) -> StudyCreate {
        StudyCreate {
            name: "CARDIO-7".to_string(),
            phase: "III".to_string(),
            therapeutic_area: "Cardiology".to_string(),
            study_question: "Does the device reduce readmissions?".to_string(),
            pool_id: pool_id.to_string(),
            metadata_template_id: None,
            metadata: Map::new(),
        }
    }

    pub fn metadata(entries: &[(&str, Value)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    pub fn assessment_create(study_id: &str) -> AssessmentCreate {
        AssessmentCreate {
            study_id: study_id.to_string(),
            name: "Initial pass".to_string(),
            progress: 0,
            total_questions: 2,
            answered_questions: 0,
            status: AssessmentStatus::InProgress,
            answers: BTreeMap::new(),
        }
    }
}
