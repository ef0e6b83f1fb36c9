//! Flag Repository (abuse report ledger)
//!
//! The denormalized `flags_count` on the reported account moves in the same
//! transaction as the flag row itself: `+= 1` on create, floored `-= 1` on
//! delete. It is never read-modified-written from Rust.
//!
//! `order` and `type` are SurrealQL keywords, hence the backtick escaping.

use chrono::Utc;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use uuid::Uuid;

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Flag, FlagStatus, FlagType, FlagView};

pub const FLAG_TABLE: &str = "flag";

const THROW_DUPLICATE: &str = "duplicate_flag";
const THROW_MISSING: &str = "flag_missing";

#[derive(Clone)]
pub struct FlagRepository {
    base: BaseRepository,
}

impl FlagRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Flag>> {
        let flag: Option<Flag> = self.base.db().select(id.clone()).await?;
        Ok(flag)
    }

    pub async fn find_by_id_str(&self, id: &str) -> RepoResult<Option<Flag>> {
        let record = parse_record_id(FLAG_TABLE, id)?;
        self.find_by_id(&record).await
    }

    /// File a report. Duplicate (order, type) pairs are rejected; the
    /// reported account's counter is incremented in the same transaction.
    pub async fn create(
        &self,
        reporter: RecordId,
        reported: RecordId,
        order: RecordId,
        reason: String,
        kind: FlagType,
    ) -> RepoResult<Flag> {
        let flag_id = RecordId::from_table_key(FLAG_TABLE, Uuid::new_v4().simple().to_string());
        let flag = Flag {
            id: None,
            reporter,
            reported: reported.clone(),
            order,
            reason,
            kind,
            status: FlagStatus::Open,
            created_at: Some(Utc::now()),
        };

        let query_str = format!(
            "BEGIN TRANSACTION;\n\
             LET $dup = (SELECT id FROM flag WHERE `order` = $order AND `type` = $kind LIMIT 1);\n\
             IF array::len($dup) > 0 {{ THROW '{THROW_DUPLICATE}' }};\n\
             CREATE $flag_id CONTENT $flag;\n\
             UPDATE $reported SET flags_count += 1;\n\
             COMMIT TRANSACTION"
        );

        let result = self
            .base
            .db()
            .query(&query_str)
            .bind(("order", flag.order.clone()))
            .bind(("kind", kind))
            .bind(("flag_id", flag_id.clone()))
            .bind(("flag", flag))
            .bind(("reported", reported))
            .await
            .map(|mut r| r.take_errors());

        match result {
            Err(e) => return Err(RepoError::Database(e.to_string())),
            Ok(errors) if !errors.is_empty() => {
                // Inside a failed transaction every statement reports the
                // generic "query was not executed" error and check() would
                // surface only the first one; scan all of them so the THROW
                // marker is seen.
                let msg = errors
                    .into_values()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                if msg.contains(THROW_DUPLICATE) || msg.contains("uniq_flag_order_type") {
                return Err(RepoError::Duplicate(
                    "This order has already been reported for this type".to_string(),
                ));
            }
            return Err(RepoError::Database(msg));
        }

        self.find_by_id(&flag_id)
            .await?
            .ok_or_else(|| RepoError::Database("Flag vanished after creation".to_string()))
    }

    /// All reports naming one account, newest first, with reporter display
    /// info resolved through the record link.
    pub async fn find_for_reported(&self, reported: &RecordId) -> RepoResult<Vec<FlagView>> {
        let flags: Vec<FlagView> = self
            .base
            .db()
            .query(
                "SELECT \
                     <string>id AS id, \
                     { id: <string>reporter, name: reporter.name, email: reporter.email } AS reporter, \
                     <string>reported AS reported, \
                     <string>`order` AS `order`, \
                     reason, `type`, status, created_at \
                 FROM flag WHERE reported = $reported ORDER BY created_at DESC",
            )
            .bind(("reported", reported.clone()))
            .await?
            .take(0)?;
        Ok(flags)
    }

    /// Update report status (already validated to open/resolved)
    pub async fn update_status(&self, id: &RecordId, status: FlagStatus) -> RepoResult<Flag> {
        let flags: Vec<Flag> = self
            .base
            .db()
            .query("UPDATE $id SET status = $status RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("status", status))
            .await?
            .take(0)?;
        flags
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Flag {id} not found")))
    }

    /// Remove a report and decrement the reported account's counter,
    /// floored at zero, atomically.
    pub async fn delete(&self, id: &RecordId) -> RepoResult<()> {
        let query_str = format!(
            "BEGIN TRANSACTION;\n\
             LET $f = (SELECT * FROM ONLY $id);\n\
             IF $f == NONE {{ THROW '{THROW_MISSING}' }};\n\
             DELETE $id;\n\
             UPDATE $f.reported SET flags_count = math::max([flags_count - 1, 0]);\n\
             COMMIT TRANSACTION"
        );

        let result = self
            .base
            .db()
            .query(&query_str)
            .bind(("id", id.clone()))
            .await
            .and_then(|r| r.check());

        if let Err(e) = result {
            let msg = e.to_string();
            if msg.contains(THROW_MISSING) {
                return Err(RepoError::NotFound(format!("Flag {id} not found")));
            }
            return Err(RepoError::Database(msg));
        }
        Ok(())
    }
}
