//! Notification Model
//!
//! In-app copy of the status-change notifications the dispatcher also
//! emails. Written best-effort by the notify worker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub account: RecordId,
    pub order: RecordId,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Notification view returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    pub id: String,
    pub order: String,
    pub message: String,
    pub is_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Notification> for NotificationView {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            order: n.order.to_string(),
            message: n.message,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}
