//! Service layer hosting all repository methods.
//!
//! `RiskService` wraps [`RiskDb`] (raw database access). All repo methods are
//! implemented as `impl RiskService` blocks, one module per entity under
//! `repos`. Every operation is an independent request/response unit: no
//! retries, no cross-document transactions, failures surface immediately as
//! typed [`DatabaseError`](crate::error::DatabaseError)s.

use crate::RiskDb;
use crate::error::DatabaseError;

/// Orchestrates all persistence operations for Risktool entities.
pub struct RiskService {
    db: RiskDb,
}

impl RiskService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` — Path to the libSQL database file, or `":memory:"` for
    ///   tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = RiskDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Create from an existing `RiskDb` (for testing).
    #[must_use]
    pub const fn from_db(db: RiskDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &RiskDb {
        &self.db
    }
}
