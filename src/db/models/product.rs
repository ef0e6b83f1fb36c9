//! Product Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Closed category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Electronics,
    Furniture,
    Clothing,
    Books,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Electronics,
        Category::Furniture,
        Category::Clothing,
        Category::Books,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Furniture => "Furniture",
            Category::Clothing => "Clothing",
            Category::Books => "Books",
            Category::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

/// Product entity
///
/// `seller` is fixed at creation and never updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub seller: RecordId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category: Category,
    #[serde(default)]
    pub delivery_time_estimate: Option<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Creation payload (seller is assigned from the authenticated requester)
#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Category,
    pub delivery_time_estimate: Option<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Update payload. Deliberately has no seller field: ownership is immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<Category>,
    pub delivery_time_estimate: Option<String>,
    pub stock: Option<i64>,
    pub images: Option<Vec<String>>,
}

/// Seller summary embedded in product listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub service_area: Option<String>,
    #[serde(default)]
    pub flags_count: i64,
}

/// Product view returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: String,
    pub seller: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_time_estimate: Option<String>,
    pub stock: i64,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_info: Option<SellerSummary>,
}

impl ProductView {
    pub fn from_product(p: Product, seller_info: Option<SellerSummary>) -> Self {
        Self {
            id: p.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            seller: p.seller.to_string(),
            title: p.title,
            description: p.description,
            price: p.price,
            category: p.category,
            delivery_time_estimate: p.delivery_time_estimate,
            stock: p.stock,
            images: p.images,
            seller_info,
        }
    }
}
