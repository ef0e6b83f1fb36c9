//! Notification Repository

use chrono::Utc;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::Notification;

pub const NOTIFICATION_TABLE: &str = "notification";

#[derive(Clone)]
pub struct NotificationRepository {
    base: BaseRepository,
}

impl NotificationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Record an in-app notification for an account
    pub async fn create(
        &self,
        account: RecordId,
        order: RecordId,
        message: String,
    ) -> RepoResult<Notification> {
        let notification = Notification {
            id: None,
            account,
            order,
            message,
            is_read: false,
            created_at: Some(Utc::now()),
        };

        let created: Option<Notification> = self
            .base
            .db()
            .create(NOTIFICATION_TABLE)
            .content(notification)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create notification".to_string()))
    }

    /// All notifications for one account, newest first
    pub async fn find_for_account(&self, account: &RecordId) -> RepoResult<Vec<Notification>> {
        let notifications: Vec<Notification> = self
            .base
            .db()
            .query(
                "SELECT * FROM notification WHERE account = $account ORDER BY created_at DESC",
            )
            .bind(("account", account.clone()))
            .await?
            .take(0)?;
        Ok(notifications)
    }

    /// Mark one notification read; `account` guards against marking someone
    /// else's notification.
    pub async fn mark_read(&self, id: &str, account: &RecordId) -> RepoResult<Notification> {
        let record = parse_record_id(NOTIFICATION_TABLE, id)?;
        let updated: Vec<Notification> = self
            .base
            .db()
            .query("UPDATE $id SET is_read = true WHERE account = $account RETURN AFTER")
            .bind(("id", record))
            .bind(("account", account.clone()))
            .await?
            .take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Notification {id} not found")))
    }
}
