//! Question pool repository.
//!
//! `question_count` is derived: every write that touches `questions`
//! recomputes it, and nothing lets a caller set it directly.
//!
//! The uploaded DOCX template lives in a BLOB column that no structured read
//! ever selects; pool reads surface only [`DocxFileMeta`]. The bytes come
//! back solely through [`RiskService::download_docx`].

use chrono::Utc;

use rtk_core::entities::{DocxFileMeta, QuestionPool, QuestionPoolCreate};
use rtk_core::ids::PREFIX_POOL;

use crate::error::DatabaseError;
use crate::helpers::{ensure_id, get_opt_string, parse_datetime, parse_json, to_json};
use crate::service::RiskService;
use crate::updates::question_pool::QuestionPoolUpdate;

const POOL_COLS: &str = "id, name, source, questions, question_count, \
                         docx_filename, docx_content_type, docx_size, docx_uploaded_at";

/// MIME type for `.docx` payloads, used when an upload did not carry one.
pub const DEFAULT_DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// A retrieved DOCX attachment, bytes included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxDownload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

fn row_to_pool(row: &libsql::Row) -> Result<QuestionPool, DatabaseError> {
    let docx_file = match get_opt_string(row, 5)? {
        Some(filename) => Some(DocxFileMeta {
            filename,
            content_type: get_opt_string(row, 6)?
                .unwrap_or_else(|| DEFAULT_DOCX_CONTENT_TYPE.to_string()),
            size: row.get::<Option<i64>>(7)?.unwrap_or(0),
            uploaded_at: parse_datetime(&row.get::<String>(8)?)?,
        }),
        None => None,
    };
    Ok(QuestionPool {
        id: row.get(0)?,
        name: row.get(1)?,
        source: row.get(2)?,
        questions: parse_json(&row.get::<String>(3)?, "question_pools.questions")?,
        question_count: row.get(4)?,
        docx_file,
    })
}

/// Strip double quotes, which would break a quoted `Content-Disposition`
/// filename.
fn sanitize_filename(filename: &str) -> String {
    filename.replace('"', "_")
}

impl RiskService {
    pub async fn create_question_pool(
        &self,
        payload: QuestionPoolCreate,
    ) -> Result<QuestionPool, DatabaseError> {
        let id = self.db().generate_id(PREFIX_POOL).await?;
        let count = i64::try_from(payload.questions.len()).unwrap_or(i64::MAX);
        self.db()
            .conn()
            .execute(
                "INSERT INTO question_pools (id, name, source, questions, question_count)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![
                    id.as_str(),
                    payload.name.as_str(),
                    payload.source.as_str(),
                    to_json(&payload.questions)?,
                    count
                ],
            )
            .await?;

        Ok(QuestionPool {
            id,
            name: payload.name,
            source: payload.source,
            questions: payload.questions,
            question_count: count,
            docx_file: None,
        })
    }

    pub async fn get_question_pool(&self, pool_id: &str) -> Result<QuestionPool, DatabaseError> {
        ensure_id(pool_id, PREFIX_POOL)?;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {POOL_COLS} FROM question_pools WHERE id = ?1"),
                [pool_id],
            )
            .await?;
        let row = rows.next().await?.ok_or_else(|| DatabaseError::NotFound {
            entity_type: "Question pool",
            id: pool_id.to_string(),
        })?;
        row_to_pool(&row)
    }

    pub async fn list_question_pools(&self) -> Result<Vec<QuestionPool>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {POOL_COLS} FROM question_pools ORDER BY name, id"),
                (),
            )
            .await?;

        let mut pools = Vec::new();
        while let Some(row) = rows.next().await? {
            pools.push(row_to_pool(&row)?);
        }
        Ok(pools)
    }

    pub async fn update_question_pool(
        &self,
        pool_id: &str,
        update: QuestionPoolUpdate,
    ) -> Result<QuestionPool, DatabaseError> {
        ensure_id(pool_id, PREFIX_POOL)?;

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1;

        if let Some(ref name) = update.name {
            sets.push(format!("name = ?{idx}"));
            params.push(name.as_str().into());
            idx += 1;
        }
        if let Some(ref source) = update.source {
            sets.push(format!("source = ?{idx}"));
            params.push(source.as_str().into());
            idx += 1;
        }
        if let Some(ref questions) = update.questions {
            sets.push(format!("questions = ?{idx}"));
            params.push(to_json(questions)?.into());
            idx += 1;
            sets.push(format!("question_count = ?{idx}"));
            params.push(i64::try_from(questions.len()).unwrap_or(i64::MAX).into());
            idx += 1;
        }

        if sets.is_empty() {
            return self.get_question_pool(pool_id).await;
        }

        let sql = format!(
            "UPDATE question_pools SET {} WHERE id = ?{idx}",
            sets.join(", ")
        );
        params.push(pool_id.into());

        let affected = self
            .db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NotFound {
                entity_type: "Question pool",
                id: pool_id.to_string(),
            });
        }

        self.get_question_pool(pool_id).await
    }

    /// Empty a pool's question list and reset the derived count.
    pub async fn clear_questions(&self, pool_id: &str) -> Result<QuestionPool, DatabaseError> {
        ensure_id(pool_id, PREFIX_POOL)?;
        let affected = self
            .db()
            .conn()
            .execute(
                "UPDATE question_pools SET questions = '[]', question_count = 0 WHERE id = ?1",
                [pool_id],
            )
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NotFound {
                entity_type: "Question pool",
                id: pool_id.to_string(),
            });
        }
        self.get_question_pool(pool_id).await
    }

    /// Attach a DOCX template to a pool, replacing any previous one.
    pub async fn upload_docx(
        &self,
        pool_id: &str,
        filename: &str,
        content_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<QuestionPool, DatabaseError> {
        ensure_id(pool_id, PREFIX_POOL)?;
        if !filename.to_lowercase().ends_with(".docx") {
            return Err(DatabaseError::InvalidUpload(format!(
                "only .docx files are accepted, got '{filename}'"
            )));
        }
        if data.is_empty() {
            return Err(DatabaseError::InvalidUpload(
                "uploaded file is empty".to_string(),
            ));
        }

        let size = i64::try_from(data.len()).unwrap_or(i64::MAX);
        let affected = self
            .db()
            .conn()
            .execute(
                "UPDATE question_pools SET docx_filename = ?1, docx_content_type = ?2, \
                 docx_size = ?3, docx_uploaded_at = ?4, docx_data = ?5 WHERE id = ?6",
                libsql::params![
                    filename,
                    content_type.unwrap_or(DEFAULT_DOCX_CONTENT_TYPE),
                    size,
                    Utc::now().to_rfc3339(),
                    data,
                    pool_id
                ],
            )
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NotFound {
                entity_type: "Question pool",
                id: pool_id.to_string(),
            });
        }
        tracing::debug!(pool_id, filename, size, "stored docx attachment");

        self.get_question_pool(pool_id).await
    }

    /// Fetch the raw DOCX attachment for a pool.
    ///
    /// Returns `Ok(None)` when the pool exists but carries no attachment; a
    /// missing pool is an error.
    pub async fn download_docx(
        &self,
        pool_id: &str,
    ) -> Result<Option<DocxDownload>, DatabaseError> {
        ensure_id(pool_id, PREFIX_POOL)?;
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT docx_filename, docx_content_type, docx_data \
                 FROM question_pools WHERE id = ?1",
                [pool_id],
            )
            .await?;
        let row = rows.next().await?.ok_or_else(|| DatabaseError::NotFound {
            entity_type: "Question pool",
            id: pool_id.to_string(),
        })?;

        let Some(data) = row.get::<Option<Vec<u8>>>(2)? else {
            return Ok(None);
        };
        let filename = get_opt_string(&row, 0)?
            .map_or_else(|| "question-pool.docx".to_string(), |f| sanitize_filename(&f));
        let content_type =
            get_opt_string(&row, 1)?.unwrap_or_else(|| DEFAULT_DOCX_CONTENT_TYPE.to_string());

        Ok(Some(DocxDownload {
            filename,
            content_type,
            data,
        }))
    }

    /// Remove a pool's DOCX attachment. No-op metadata-wise if none exists.
    pub async fn delete_docx(&self, pool_id: &str) -> Result<QuestionPool, DatabaseError> {
        ensure_id(pool_id, PREFIX_POOL)?;
        let affected = self
            .db()
            .conn()
            .execute(
                "UPDATE question_pools SET docx_filename = NULL, docx_content_type = NULL, \
                 docx_size = NULL, docx_uploaded_at = NULL, docx_data = NULL WHERE id = ?1",
                [pool_id],
            )
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NotFound {
                entity_type: "Question pool",
                id: pool_id.to_string(),
            });
        }
        self.get_question_pool(pool_id).await
    }

    /// Delete a pool and return the deleted snapshot.
    pub async fn delete_question_pool(
        &self,
        pool_id: &str,
    ) -> Result<QuestionPool, DatabaseError> {
        let existing = self.get_question_pool(pool_id).await?;
        self.db()
            .conn()
            .execute("DELETE FROM question_pools WHERE id = ?1", [pool_id])
            .await?;
        Ok(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{pool_create, question, test_service};
    use crate::updates::question_pool::QuestionPoolUpdateBuilder;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_derives_question_count() {
        let svc = test_service().await;
        let pool = svc.create_question_pool(pool_create()).await.unwrap();

        assert!(pool.id.starts_with("qpl-"));
        assert_eq!(pool.question_count, 2);
        assert!(pool.docx_file.is_none());
    }

    #[tokio::test]
    async fn replacing_questions_recomputes_count() {
        let svc = test_service().await;
        let pool = svc.create_question_pool(pool_create()).await.unwrap();

        let update = QuestionPoolUpdateBuilder::new()
            .questions(vec![question("q9", "Training", "Is training documented?")])
            .build();
        let updated = svc.update_question_pool(&pool.id, update).await.unwrap();

        assert_eq!(updated.questions.len(), 1);
        assert_eq!(updated.question_count, 1);
    }

    #[tokio::test]
    async fn clear_questions_resets_count() {
        let svc = test_service().await;
        let pool = svc.create_question_pool(pool_create()).await.unwrap();

        let cleared = svc.clear_questions(&pool.id).await.unwrap();
        assert!(cleared.questions.is_empty());
        assert_eq!(cleared.question_count, 0);
    }

    #[tokio::test]
    async fn upload_rejects_non_docx_and_empty_payloads() {
        let svc = test_service().await;
        let pool = svc.create_question_pool(pool_create()).await.unwrap();

        let err = svc
            .upload_docx(&pool.id, "template.pdf", None, vec![1, 2, 3])
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidUpload(_)));

        let err = svc
            .upload_docx(&pool.id, "template.docx", None, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidUpload(_)));
    }

    #[tokio::test]
    async fn upload_accepts_uppercase_extension() {
        let svc = test_service().await;
        let pool = svc.create_question_pool(pool_create()).await.unwrap();

        let updated = svc
            .upload_docx(&pool.id, "TEMPLATE.DOCX", None, vec![0x50, 0x4b])
            .await
            .unwrap();
        let meta = updated.docx_file.unwrap();
        assert_eq!(meta.filename, "TEMPLATE.DOCX");
        assert_eq!(meta.size, 2);
        assert_eq!(meta.content_type, DEFAULT_DOCX_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn download_roundtrips_bytes_and_sanitizes_filename() {
        let svc = test_service().await;
        let pool = svc.create_question_pool(pool_create()).await.unwrap();

        let bytes = vec![0x50, 0x4b, 0x03, 0x04];
        svc.upload_docx(&pool.id, "site \"A\"'s template.docx", None, bytes.clone())
            .await
            .unwrap();

        // Double quotes are replaced; single quotes are header-safe and kept.
        let download = svc.download_docx(&pool.id).await.unwrap().unwrap();
        assert_eq!(download.data, bytes);
        assert_eq!(download.filename, "site _A_'s template.docx");
        assert_eq!(download.content_type, DEFAULT_DOCX_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn download_without_attachment_is_none() {
        let svc = test_service().await;
        let pool = svc.create_question_pool(pool_create()).await.unwrap();

        assert!(svc.download_docx(&pool.id).await.unwrap().is_none());

        let err = svc.download_docx("qpl-deadbeef").await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn structured_reads_never_carry_the_blob() {
        let svc = test_service().await;
        let pool = svc.create_question_pool(pool_create()).await.unwrap();
        svc.upload_docx(&pool.id, "t.docx", None, vec![1; 1024])
            .await
            .unwrap();

        let fetched = svc.get_question_pool(&pool.id).await.unwrap();
        let json = serde_json::to_string(&fetched).unwrap();
        assert!(json.contains("docxFile"));
        assert!(!json.contains("data"));
        assert_eq!(fetched.docx_file.unwrap().size, 1024);
    }

    #[tokio::test]
    async fn delete_docx_detaches_the_template() {
        let svc = test_service().await;
        let pool = svc.create_question_pool(pool_create()).await.unwrap();
        svc.upload_docx(&pool.id, "t.docx", None, vec![1])
            .await
            .unwrap();

        let detached = svc.delete_docx(&pool.id).await.unwrap();
        assert!(detached.docx_file.is_none());
        assert!(svc.download_docx(&pool.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_pool_returns_the_deleted_snapshot() {
        let svc = test_service().await;
        let pool = svc.create_question_pool(pool_create()).await.unwrap();

        let deleted = svc.delete_question_pool(&pool.id).await.unwrap();
        assert_eq!(deleted.id, pool.id);

        let err = svc.get_question_pool(&pool.id).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }
}
