//! Database Module
//!
//! Embedded SurrealDB storage. The server runs on the RocksDB engine under
//! the work directory; tests use the in-memory engine through the same
//! service type.

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "souk";
const DATABASE: &str = "marketplace";

/// Database service, owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database at `db_path`
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        Self::init(db).await
    }

    /// In-memory database (tests)
    pub async fn memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::init(db).await
    }

    async fn init(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;

        tracing::info!("Database ready (ns={NAMESPACE}, db={DATABASE})");
        Ok(Self { db })
    }
}

/// Idempotent index definitions.
///
/// The unique indexes are the database-level backstop for invariants the
/// repositories also check up front: one account per email, at most one
/// flag of a given type per order.
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE INDEX IF NOT EXISTS uniq_account_email ON TABLE account FIELDS email UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_product_seller ON TABLE product FIELDS seller;
        DEFINE INDEX IF NOT EXISTS idx_order_buyer ON TABLE `order` FIELDS buyer;
        DEFINE INDEX IF NOT EXISTS idx_order_seller ON TABLE `order` FIELDS seller;
        DEFINE INDEX IF NOT EXISTS idx_flag_reported ON TABLE flag FIELDS reported;
        DEFINE INDEX IF NOT EXISTS uniq_flag_order_type ON TABLE flag FIELDS `order`, `type` UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_notification_account ON TABLE notification FIELDS account;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?
    .check()
    .map_err(|e| AppError::database(format!("Schema definition failed: {e}")))?;
    Ok(())
}
