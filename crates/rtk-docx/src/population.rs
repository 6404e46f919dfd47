//! Populated report assembly.
//!
//! Chains the four preconditions (assessment, study, pool, uploaded
//! template), builds the binding context, and invokes the renderer. Each
//! precondition failure is distinct so the caller learns the first missing
//! link; ownership scoping applies to the study lookup, so a foreign study
//! reads as missing.

use serde_json::{Map, Value};
use tracing::debug;

use rtk_db::error::DatabaseError;
use rtk_db::service::RiskService;

use crate::binder::build_context;
use crate::error::DocxError;
use crate::renderer::DocxRenderer;

/// A rendered report ready to hand back as a file attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulatedDocx {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Derive the output name: base name with `-populated` before the extension,
/// defaulting to `.docx` when the template name has none.
#[must_use]
pub fn populated_filename(template_filename: &str) -> String {
    let split = template_filename
        .rfind('.')
        .filter(|&i| template_filename[..i].chars().any(|c| c != '.'));
    match split {
        Some(i) => format!(
            "{}-populated{}",
            &template_filename[..i],
            &template_filename[i..]
        ),
        None => format!("{template_filename}-populated.docx"),
    }
}

/// Orchestrates one populate pass per call; holds only the renderer.
pub struct AssessmentDocxService<R> {
    renderer: R,
}

impl<R: DocxRenderer> AssessmentDocxService<R> {
    pub const fn new(renderer: R) -> Self {
        Self { renderer }
    }

    /// Render the pool's uploaded template with the assessment's answers.
    ///
    /// # Errors
    ///
    /// Returns a precondition variant for the first missing record, a
    /// `Render` error if the template engine rejects the input, or a
    /// passthrough store error for anything else.
    pub async fn populate(
        &self,
        service: &RiskService,
        assessment_id: &str,
        owner_id: Option<&str>,
    ) -> Result<PopulatedDocx, DocxError> {
        let assessment = match service.get_assessment(assessment_id).await {
            Ok(assessment) => assessment,
            Err(DatabaseError::NotFound { .. } | DatabaseError::BadIdentifier { .. }) => {
                return Err(DocxError::AssessmentNotFound {
                    id: assessment_id.to_string(),
                });
            }
            Err(other) => return Err(DocxError::Db(other)),
        };

        let study = match service.get_study(&assessment.study_id, owner_id).await {
            Ok(study) => study,
            Err(DatabaseError::NotFound { .. } | DatabaseError::BadIdentifier { .. }) => {
                return Err(DocxError::StudyNotFound {
                    id: assessment.study_id.clone(),
                });
            }
            Err(other) => return Err(DocxError::Db(other)),
        };

        let pool = match service.get_question_pool(&study.pool_id).await {
            Ok(pool) => pool,
            Err(DatabaseError::NotFound { .. } | DatabaseError::BadIdentifier { .. }) => {
                return Err(DocxError::PoolNotFound {
                    id: study.pool_id.clone(),
                });
            }
            Err(other) => return Err(DocxError::Db(other)),
        };

        let template = match service.download_docx(&study.pool_id).await {
            Ok(Some(template)) => template,
            Ok(None) => {
                return Err(DocxError::TemplateNotUploaded {
                    pool_id: study.pool_id.clone(),
                });
            }
            Err(other) => return Err(DocxError::Db(other)),
        };

        let context: Map<String, Value> = build_context(&study, &pool, &assessment)?;
        debug!(
            assessment_id,
            study_id = %study.id,
            pool_id = %pool.id,
            questions = pool.questions.len(),
            "rendering populated report"
        );

        let data = self.renderer.render(&template.data, &context)?;
        Ok(PopulatedDocx {
            filename: populated_filename(&template.filename),
            content_type: template.content_type,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use super::*;
    use crate::renderer::RenderError;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use rtk_core::entities::{AssessmentCreate, Question, QuestionPoolCreate, StudyCreate};
    use rtk_core::enums::AssessmentStatus;
    use serde_json::json;

    const OWNER: &str = "user-alice";

    #[rstest]
    #[case("report.docx", "report-populated.docx")]
    #[case("REPORT.DOCX", "REPORT-populated.DOCX")]
    #[case("report", "report-populated.docx")]
    #[case("archive.tar.gz", "archive.tar-populated.gz")]
    #[case(".docx", ".docx-populated.docx")]
    fn populated_filename_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(populated_filename(input), expected);
    }

    /// Records every context it renders and echoes the template bytes with a
    /// marker appended.
    #[derive(Default)]
    struct FakeRenderer {
        calls: Mutex<Vec<Map<String, Value>>>,
    }

    impl DocxRenderer for FakeRenderer {
        fn render(
            &self,
            template: &[u8],
            context: &Map<String, Value>,
        ) -> Result<Vec<u8>, RenderError> {
            self.calls.lock().unwrap().push(context.clone());
            let mut out = template.to_vec();
            out.extend_from_slice(b"|rendered");
            Ok(out)
        }
    }

    struct FailingRenderer;

    impl DocxRenderer for FailingRenderer {
        fn render(&self, _: &[u8], _: &Map<String, Value>) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::UnresolvedExpression("{{ missing }}".into()))
        }
    }

    async fn service() -> RiskService {
        RiskService::new_local(":memory:").await.unwrap()
    }

    async fn seed(svc: &RiskService, with_template: bool) -> (String, String) {
        let pool = svc
            .create_question_pool(QuestionPoolCreate {
                name: "Audit".into(),
                source: "import".into(),
                questions: vec![Question {
                    id: "q1".into(),
                    identifier: "Consent Records".into(),
                    text: "Are consent records complete?".into(),
                    domain: "Data Integrity".into(),
                    risk_type: "Operational".into(),
                    iso_reference: "ISO 14155:2020 6.4".into(),
                }],
            })
            .await
            .unwrap();
        if with_template {
            svc.upload_docx(&pool.id, "report.docx", None, vec![0x50, 0x4b])
                .await
                .unwrap();
        }

        let study = svc
            .create_study(
                OWNER,
                StudyCreate {
                    name: "CARDIO-7".into(),
                    phase: "III".into(),
                    therapeutic_area: "Cardiology".into(),
                    study_question: "Does it work?".into(),
                    pool_id: pool.id,
                    metadata_template_id: None,
                    metadata: Map::new(),
                },
            )
            .await
            .unwrap();

        let mut answers = BTreeMap::new();
        answers.insert("q1".to_string(), "Yes, complete".to_string());
        let assessment = svc
            .create_assessment(AssessmentCreate {
                study_id: study.id.clone(),
                name: "Initial pass".into(),
                progress: 100,
                total_questions: 1,
                answered_questions: 1,
                status: AssessmentStatus::Completed,
                answers,
            })
            .await
            .unwrap();

        (study.id, assessment.id)
    }

    #[tokio::test]
    async fn populate_renders_the_bound_context() {
        let svc = service().await;
        let (_, assessment_id) = seed(&svc, true).await;

        let docx = AssessmentDocxService::new(FakeRenderer::default());
        let populated = docx
            .populate(&svc, &assessment_id, Some(OWNER))
            .await
            .unwrap();

        assert_eq!(populated.filename, "report-populated.docx");
        assert_eq!(
            populated.content_type,
            rtk_db::repos::question_pool::DEFAULT_DOCX_CONTENT_TYPE
        );
        assert_eq!(populated.data, b"\x50\x4b|rendered".to_vec());

        let calls = docx.renderer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["consent_records"], json!("Yes, complete"));
        assert_eq!(calls[0]["study"]["name"], json!("CARDIO-7"));
    }

    #[tokio::test]
    async fn missing_assessment_is_the_first_failure() {
        let svc = service().await;
        seed(&svc, true).await;

        let docx = AssessmentDocxService::new(FakeRenderer::default());
        let err = docx
            .populate(&svc, "asm-deadbeef", Some(OWNER))
            .await
            .unwrap_err();
        assert!(matches!(err, DocxError::AssessmentNotFound { .. }));
        assert_eq!(err.status_code(), 404);

        // Malformed ids read as missing, not as a 400.
        let err = docx
            .populate(&svc, "not-an-id", Some(OWNER))
            .await
            .unwrap_err();
        assert!(matches!(err, DocxError::AssessmentNotFound { .. }));
    }

    #[tokio::test]
    async fn foreign_owner_sees_study_not_found() {
        let svc = service().await;
        let (_, assessment_id) = seed(&svc, true).await;

        let docx = AssessmentDocxService::new(FakeRenderer::default());
        let err = docx
            .populate(&svc, &assessment_id, Some("user-mallory"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocxError::StudyNotFound { .. }));
    }

    #[tokio::test]
    async fn deleted_pool_surfaces_as_pool_not_found() {
        let svc = service().await;
        let (study_id, assessment_id) = seed(&svc, true).await;

        let pool_id = svc
            .get_study(&study_id, Some(OWNER))
            .await
            .unwrap()
            .pool_id;
        svc.delete_question_pool(&pool_id).await.unwrap();

        let docx = AssessmentDocxService::new(FakeRenderer::default());
        let err = docx
            .populate(&svc, &assessment_id, Some(OWNER))
            .await
            .unwrap_err();
        assert!(matches!(err, DocxError::PoolNotFound { .. }));
    }

    #[tokio::test]
    async fn missing_template_is_distinct_from_missing_pool() {
        let svc = service().await;
        let (_, assessment_id) = seed(&svc, false).await;

        let docx = AssessmentDocxService::new(FakeRenderer::default());
        let err = docx
            .populate(&svc, &assessment_id, Some(OWNER))
            .await
            .unwrap_err();
        assert!(matches!(err, DocxError::TemplateNotUploaded { .. }));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn render_failure_propagates_without_partial_output() {
        let svc = service().await;
        let (_, assessment_id) = seed(&svc, true).await;

        let docx = AssessmentDocxService::new(FailingRenderer);
        let err = docx
            .populate(&svc, &assessment_id, Some(OWNER))
            .await
            .unwrap_err();
        assert!(matches!(err, DocxError::Render(_)));
        assert_eq!(err.status_code(), 500);
    }
}
