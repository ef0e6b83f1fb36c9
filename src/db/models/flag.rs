//! Flag Model (abuse report)
//!
//! A report one party files against the other, always tied to a specific
//! order. At most one flag of each type may exist per order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Which direction the report points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagType {
    SellerFlaggingBuyer,
    BuyerFlaggingSeller,
}

impl FlagType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagType::SellerFlaggingBuyer => "seller_flagging_buyer",
            FlagType::BuyerFlaggingSeller => "buyer_flagging_seller",
        }
    }
}

/// Report lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagStatus {
    Open,
    Resolved,
}

impl FlagStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(FlagStatus::Open),
            "resolved" => Some(FlagStatus::Resolved),
            _ => None,
        }
    }
}

/// Flag entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub reporter: RecordId,
    pub reported: RecordId,
    pub order: RecordId,
    pub reason: String,
    #[serde(rename = "type")]
    pub kind: FlagType,
    pub status: FlagStatus,
    pub created_at: Option<DateTime<Utc>>,
}

/// Creation request body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagCreateRequest {
    pub reported_id: String,
    pub order_id: String,
    pub reason: String,
    #[serde(rename = "type")]
    pub kind: FlagType,
}

/// Status update request body
#[derive(Debug, Clone, Deserialize)]
pub struct FlagStatusRequest {
    pub status: String,
}

/// Reporter display info attached to listed flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterInfo {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Flag view returned by the API, annotated with reporter display info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagView {
    pub id: String,
    pub reporter: ReporterInfo,
    pub reported: String,
    pub order: String,
    pub reason: String,
    #[serde(rename = "type")]
    pub kind: FlagType,
    pub status: FlagStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
