//! Repository Module
//!
//! Per-table CRUD plus the transactional workflows (order creation, status
//! transitions, flag ledger) that must mutate several records atomically.

pub mod account;
pub mod flag;
pub mod notification;
pub mod order;
pub mod product;

pub use account::AccountRepository;
pub use flag::FlagRepository;
pub use notification::NotificationRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::RecordId;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Parse an API-supplied ID ("table:key") and check it targets `table`.
pub fn parse_record_id(table: &str, id: &str) -> RepoResult<RecordId> {
    // Accept both bare keys and fully qualified "table:key" strings
    let record: RecordId = if id.contains(':') {
        id.parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {id}")))?
    } else {
        RecordId::from_table_key(table, id)
    };

    if record.table() != table {
        return Err(RepoError::Validation(format!(
            "Expected a {table} ID, got: {id}"
        )));
    }
    Ok(record)
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
