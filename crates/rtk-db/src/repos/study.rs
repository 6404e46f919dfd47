//! Study repository — owner-scoped CRUD plus the metadata binding.
//!
//! A study may reference a metadata template. Whenever its metadata or the
//! template reference changes, the metadata is validated against the
//! template's current fields and a frozen copy of those fields is written to
//! `metadata_template_snapshot`. Metadata without a template is rejected.
//!
//! Non-admin callers pass their owner id; every read and write is then scoped
//! to `owner_id`, so a foreign study is indistinguishable from a missing one.
//! Admins pass `None` and see everything.

use chrono::Utc;
use serde_json::{Map, Value};

use rtk_core::entities::{MetadataFieldDef, Study, StudyCreate};
use rtk_core::ids::PREFIX_STUDY;
use rtk_core::metadata::{ValidationError, validate_metadata};

use crate::error::DatabaseError;
use crate::helpers::{ensure_id, get_opt_string, parse_datetime, parse_json, to_json};
use crate::service::RiskService;
use crate::updates::study::StudyUpdate;

const STUDY_COLS: &str = "id, name, phase, therapeutic_area, study_question, pool_id, owner_id, \
                          metadata_template_id, metadata, metadata_template_snapshot, \
                          created_at, updated_at";

fn row_to_study(row: &libsql::Row) -> Result<Study, DatabaseError> {
    let snapshot = match get_opt_string(row, 9)? {
        Some(json) => Some(parse_json(&json, "studies.metadata_template_snapshot")?),
        None => None,
    };
    Ok(Study {
        id: row.get(0)?,
        name: row.get(1)?,
        phase: row.get(2)?,
        therapeutic_area: row.get(3)?,
        study_question: row.get(4)?,
        pool_id: row.get(5)?,
        owner_id: row.get(6)?,
        metadata_template_id: get_opt_string(row, 7)?,
        metadata: parse_json(&row.get::<String>(8)?, "studies.metadata")?,
        metadata_template_snapshot: snapshot,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

impl RiskService {
    /// Look up a template, validate `metadata` against its fields, and return
    /// the fields for snapshotting.
    ///
    /// A missing or malformed template id surfaces as a validation error on
    /// the study operation, not as a 404 for the template itself.
    async fn resolve_snapshot(
        &self,
        template_id: &str,
        metadata: &Map<String, Value>,
    ) -> Result<Vec<MetadataFieldDef>, DatabaseError> {
        let template = match self.get_metadata_template(template_id).await {
            Ok(template) => template,
            Err(DatabaseError::NotFound { .. } | DatabaseError::BadIdentifier { .. }) => {
                return Err(ValidationError::TemplateNotFound {
                    id: template_id.to_string(),
                }
                .into());
            }
            Err(other) => return Err(other),
        };
        validate_metadata(metadata, &template.fields)?;
        Ok(template.fields)
    }

    pub async fn create_study(
        &self,
        owner_id: &str,
        payload: StudyCreate,
    ) -> Result<Study, DatabaseError> {
        let snapshot = match &payload.metadata_template_id {
            Some(template_id) => Some(self.resolve_snapshot(template_id, &payload.metadata).await?),
            None if payload.metadata.is_empty() => None,
            None => return Err(ValidationError::MetadataWithoutTemplate.into()),
        };

        let id = self.db().generate_id(PREFIX_STUDY).await?;
        let now = Utc::now();
        let snapshot_json = match &snapshot {
            Some(fields) => Some(to_json(fields)?),
            None => None,
        };
        self.db()
            .conn()
            .execute(
                "INSERT INTO studies (id, name, phase, therapeutic_area, study_question, pool_id, \
                 owner_id, metadata_template_id, metadata, metadata_template_snapshot, \
                 created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                libsql::params![
                    id.as_str(),
                    payload.name.as_str(),
                    payload.phase.as_str(),
                    payload.therapeutic_area.as_str(),
                    payload.study_question.as_str(),
                    payload.pool_id.as_str(),
                    owner_id,
                    payload.metadata_template_id.as_deref(),
                    to_json(&payload.metadata)?,
                    snapshot_json.as_deref(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(Study {
            id,
            name: payload.name,
            phase: payload.phase,
            therapeutic_area: payload.therapeutic_area,
            study_question: payload.study_question,
            pool_id: payload.pool_id,
            owner_id: owner_id.to_string(),
            metadata_template_id: payload.metadata_template_id,
            metadata: payload.metadata,
            metadata_template_snapshot: snapshot,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_study(
        &self,
        study_id: &str,
        owner_id: Option<&str>,
    ) -> Result<Study, DatabaseError> {
        ensure_id(study_id, PREFIX_STUDY)?;
        let not_found = || DatabaseError::NotFound {
            entity_type: "Study",
            id: study_id.to_string(),
        };
        let mut rows = match owner_id {
            Some(owner) => {
                self.db()
                    .conn()
                    .query(
                        &format!("SELECT {STUDY_COLS} FROM studies WHERE id = ?1 AND owner_id = ?2"),
                        [study_id, owner],
                    )
                    .await?
            }
            None => {
                self.db()
                    .conn()
                    .query(
                        &format!("SELECT {STUDY_COLS} FROM studies WHERE id = ?1"),
                        [study_id],
                    )
                    .await?
            }
        };
        let row = rows.next().await?.ok_or_else(not_found)?;
        row_to_study(&row)
    }

    pub async fn list_studies(&self, owner_id: Option<&str>) -> Result<Vec<Study>, DatabaseError> {
        let mut rows = match owner_id {
            Some(owner) => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {STUDY_COLS} FROM studies WHERE owner_id = ?1 \
                             ORDER BY created_at, id"
                        ),
                        [owner],
                    )
                    .await?
            }
            None => {
                self.db()
                    .conn()
                    .query(
                        &format!("SELECT {STUDY_COLS} FROM studies ORDER BY created_at, id"),
                        (),
                    )
                    .await?
            }
        };

        let mut studies = Vec::new();
        while let Some(row) = rows.next().await? {
            studies.push(row_to_study(&row)?);
        }
        Ok(studies)
    }

    pub async fn update_study(
        &self,
        study_id: &str,
        owner_id: Option<&str>,
        update: StudyUpdate,
    ) -> Result<Study, DatabaseError> {
        // Scoped fetch doubles as the ownership check.
        let current = self.get_study(study_id, owner_id).await?;

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1;

        if let Some(ref name) = update.name {
            sets.push(format!("name = ?{idx}"));
            params.push(name.as_str().into());
            idx += 1;
        }
        if let Some(ref phase) = update.phase {
            sets.push(format!("phase = ?{idx}"));
            params.push(phase.as_str().into());
            idx += 1;
        }
        if let Some(ref area) = update.therapeutic_area {
            sets.push(format!("therapeutic_area = ?{idx}"));
            params.push(area.as_str().into());
            idx += 1;
        }
        if let Some(ref question) = update.study_question {
            sets.push(format!("study_question = ?{idx}"));
            params.push(question.as_str().into());
            idx += 1;
        }
        if let Some(ref pool_id) = update.pool_id {
            sets.push(format!("pool_id = ?{idx}"));
            params.push(pool_id.as_str().into());
            idx += 1;
        }

        if update.touches_metadata() {
            let effective_template_id = match &update.metadata_template_id {
                Some(Some(id)) => Some(id.clone()),
                Some(None) => None,
                None => current.metadata_template_id.clone(),
            };
            let effective_metadata = update.metadata.unwrap_or_else(|| current.metadata.clone());

            match effective_template_id {
                Some(template_id) => {
                    let snapshot = self
                        .resolve_snapshot(&template_id, &effective_metadata)
                        .await?;
                    sets.push(format!("metadata_template_id = ?{idx}"));
                    params.push(template_id.into());
                    idx += 1;
                    sets.push(format!("metadata = ?{idx}"));
                    params.push(to_json(&effective_metadata)?.into());
                    idx += 1;
                    sets.push(format!("metadata_template_snapshot = ?{idx}"));
                    params.push(to_json(&snapshot)?.into());
                    idx += 1;
                }
                None => {
                    if !effective_metadata.is_empty() {
                        return Err(ValidationError::MetadataWithoutTemplate.into());
                    }
                    sets.push("metadata_template_id = NULL".to_string());
                    sets.push("metadata = '{}'".to_string());
                    sets.push("metadata_template_snapshot = NULL".to_string());
                }
            }
        }

        if sets.is_empty() {
            return Ok(current);
        }

        sets.push(format!("updated_at = ?{idx}"));
        params.push(Utc::now().to_rfc3339().into());
        idx += 1;

        let sql = format!("UPDATE studies SET {} WHERE id = ?{idx}", sets.join(", "));
        params.push(study_id.into());

        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.get_study(study_id, owner_id).await
    }

    /// Delete a study and return the deleted snapshot.
    pub async fn delete_study(
        &self,
        study_id: &str,
        owner_id: Option<&str>,
    ) -> Result<Study, DatabaseError> {
        let existing = self.get_study(study_id, owner_id).await?;
        self.db()
            .conn()
            .execute("DELETE FROM studies WHERE id = ?1", [study_id])
            .await?;
        Ok(existing)
    }
}
