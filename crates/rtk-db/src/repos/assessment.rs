//! Assessment repository — answer sets recorded against a study.

use chrono::Utc;

use rtk_core::entities::{Assessment, AssessmentCreate};
use rtk_core::ids::{PREFIX_ASSESSMENT, PREFIX_STUDY};

use crate::error::DatabaseError;
use crate::helpers::{ensure_id, parse_datetime, parse_enum, parse_json, to_json};
use crate::service::RiskService;
use crate::updates::assessment::AssessmentUpdate;

const ASSESSMENT_COLS: &str = "id, study_id, name, progress, total_questions, \
                               answered_questions, status, answers, created_at, updated_at";

fn row_to_assessment(row: &libsql::Row) -> Result<Assessment, DatabaseError> {
    Ok(Assessment {
        id: row.get(0)?,
        study_id: row.get(1)?,
        name: row.get(2)?,
        progress: row.get(3)?,
        total_questions: row.get(4)?,
        answered_questions: row.get(5)?,
        status: parse_enum(&row.get::<String>(6)?)?,
        answers: parse_json(&row.get::<String>(7)?, "assessments.answers")?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
        updated_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

impl RiskService {
    pub async fn create_assessment(
        &self,
        payload: AssessmentCreate,
    ) -> Result<Assessment, DatabaseError> {
        ensure_id(&payload.study_id, PREFIX_STUDY)?;

        let id = self.db().generate_id(PREFIX_ASSESSMENT).await?;
        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "INSERT INTO assessments (id, study_id, name, progress, total_questions, \
                 answered_questions, status, answers, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                libsql::params![
                    id.as_str(),
                    payload.study_id.as_str(),
                    payload.name.as_str(),
                    payload.progress,
                    payload.total_questions,
                    payload.answered_questions,
                    payload.status.as_str(),
                    to_json(&payload.answers)?,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(Assessment {
            id,
            study_id: payload.study_id,
            name: payload.name,
            progress: payload.progress,
            total_questions: payload.total_questions,
            answered_questions: payload.answered_questions,
            status: payload.status,
            answers: payload.answers,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_assessment(&self, assessment_id: &str) -> Result<Assessment, DatabaseError> {
        ensure_id(assessment_id, PREFIX_ASSESSMENT)?;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {ASSESSMENT_COLS} FROM assessments WHERE id = ?1"),
                [assessment_id],
            )
            .await?;
        let row = rows.next().await?.ok_or_else(|| DatabaseError::NotFound {
            entity_type: "Assessment",
            id: assessment_id.to_string(),
        })?;
        row_to_assessment(&row)
    }

    /// List assessments, optionally filtered to one study.
    pub async fn list_assessments(
        &self,
        study_id: Option<&str>,
    ) -> Result<Vec<Assessment>, DatabaseError> {
        let mut rows = match study_id {
            Some(study) => {
                ensure_id(study, PREFIX_STUDY)?;
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {ASSESSMENT_COLS} FROM assessments WHERE study_id = ?1 \
                             ORDER BY created_at, id"
                        ),
                        [study],
                    )
                    .await?
            }
            None => {
                self.db()
                    .conn()
                    .query(
                        &format!("SELECT {ASSESSMENT_COLS} FROM assessments ORDER BY created_at, id"),
                        (),
                    )
                    .await?
            }
        };

        let mut assessments = Vec::new();
        while let Some(row) = rows.next().await? {
            assessments.push(row_to_assessment(&row)?);
        }
        Ok(assessments)
    }

    pub async fn update_assessment(
        &self,
        assessment_id: &str,
        update: AssessmentUpdate,
    ) -> Result<Assessment, DatabaseError> {
        ensure_id(assessment_id, PREFIX_ASSESSMENT)?;

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1;

        if let Some(ref name) = update.name {
            sets.push(format!("name = ?{idx}"));
            params.push(name.as_str().into());
            idx += 1;
        }
        if let Some(progress) = update.progress {
            sets.push(format!("progress = ?{idx}"));
            params.push(progress.into());
            idx += 1;
        }
        if let Some(total) = update.total_questions {
            sets.push(format!("total_questions = ?{idx}"));
            params.push(total.into());
            idx += 1;
        }
        if let Some(answered) = update.answered_questions {
            sets.push(format!("answered_questions = ?{idx}"));
            params.push(answered.into());
            idx += 1;
        }
        if let Some(status) = update.status {
            sets.push(format!("status = ?{idx}"));
            params.push(status.as_str().into());
            idx += 1;
        }
        if let Some(ref answers) = update.answers {
            sets.push(format!("answers = ?{idx}"));
            params.push(to_json(answers)?.into());
            idx += 1;
        }

        if sets.is_empty() {
            return self.get_assessment(assessment_id).await;
        }

        sets.push(format!("updated_at = ?{idx}"));
        params.push(Utc::now().to_rfc3339().into());
        idx += 1;

        let sql = format!(
            "UPDATE assessments SET {} WHERE id = ?{idx}",
            sets.join(", ")
        );
        params.push(assessment_id.into());

        let affected = self
            .db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NotFound {
                entity_type: "Assessment",
                id: assessment_id.to_string(),
            });
        }

        self.get_assessment(assessment_id).await
    }

    /// Delete an assessment and return the deleted snapshot.
    pub async fn delete_assessment(
        &self,
        assessment_id: &str,
    ) -> Result<Assessment, DatabaseError> {
        let existing = self.get_assessment(assessment_id).await?;
        self.db()
            .conn()
            .execute("DELETE FROM assessments WHERE id = ?1", [assessment_id])
            .await?;
        Ok(existing)
    }
}
