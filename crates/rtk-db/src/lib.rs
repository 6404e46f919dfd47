//! # rtk-db
//!
//! libSQL persistence for Risktool state: question pools, studies,
//! assessments, and metadata templates, plus the study metadata binding that
//! validates and snapshots template fields onto studies.
//!
//! All repo methods live on [`service::RiskService`], one module per entity
//! under [`repos`]. Updates are non-destructive partial merges driven by the
//! builder structs in [`updates`].

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle for all Risktool state operations.
///
/// Wraps a libSQL database and connection, and provides ID generation.
pub struct RiskDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl RiskDb {
    /// Open a local-only database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Must be set per-connection in SQLite.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let risk_db = Self { db, conn };
        risk_db.run_migrations().await?;
        tracing::debug!(path, "opened local database");
        Ok(risk_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"std-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the
    /// prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::Query("id generation returned no rows".into()))?;
        Ok(row.get::<String>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtk_core::ids::{self, PREFIX_STUDY};

    async fn test_db() -> RiskDb {
        RiskDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;
        let mut rows = db
            .conn()
            .query(
                "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                (),
            )
            .await
            .unwrap();

        let mut tables = Vec::new();
        while let Some(row) = rows.next().await.unwrap() {
            tables.push(row.get::<String>(0).unwrap());
        }
        for expected in [
            "assessments",
            "metadata_templates",
            "question_pools",
            "studies",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing {expected}");
        }
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id(PREFIX_STUDY).await.unwrap();
        assert!(ids::is_valid_id(&id, PREFIX_STUDY), "bad id: {id}");
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("risktool.db");
        let path = path.to_str().unwrap();

        {
            let db = RiskDb::open_local(path).await.unwrap();
            db.conn()
                .execute(
                    "INSERT INTO metadata_templates (id, name, version, fields, created_at, updated_at)
                     VALUES ('mdt-00000001', 't', 1, '[]', '2026-01-01 00:00:00', '2026-01-01 00:00:00')",
                    (),
                )
                .await
                .unwrap();
        }

        let db = RiskDb::open_local(path).await.unwrap();
        let mut rows = db
            .conn()
            .query("SELECT COUNT(*) FROM metadata_templates", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }
}
