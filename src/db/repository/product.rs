//! Product Repository

use chrono::Utc;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Category, Product, ProductCreate, ProductUpdate};

pub const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All products, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Products in one category
    pub async fn find_by_category(&self, category: Category) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE category = $category ORDER BY created_at DESC")
            .bind(("category", category))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Products owned by one seller
    pub async fn find_by_seller(&self, seller: &RecordId) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE seller = $seller ORDER BY created_at DESC")
            .bind(("seller", seller.clone()))
            .await?
            .take(0)?;
        Ok(products)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self.base.db().select(id.clone()).await?;
        Ok(product)
    }

    pub async fn find_by_id_str(&self, id: &str) -> RepoResult<Option<Product>> {
        let record = parse_record_id(PRODUCT_TABLE, id)?;
        self.find_by_id(&record).await
    }

    /// Create a new product owned by `seller`
    pub async fn create(&self, seller: RecordId, data: ProductCreate) -> RepoResult<Product> {
        if data.price < 0.0 {
            return Err(RepoError::Validation("price must not be negative".into()));
        }
        if data.stock < 0 {
            return Err(RepoError::Validation("stock must not be negative".into()));
        }

        let now = Utc::now();
        let product = Product {
            id: None,
            seller,
            title: data.title,
            description: data.description,
            price: data.price,
            category: data.category,
            delivery_time_estimate: data.delivery_time_estimate,
            stock: data.stock,
            images: data.images,
            created_at: Some(now),
            updated_at: Some(now),
        };

        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product. The seller reference is immutable: `ProductUpdate`
    /// has no seller field, so no query built here can move ownership.
    pub async fn update(&self, id: &RecordId, data: ProductUpdate) -> RepoResult<Product> {
        if let Some(price) = data.price
            && price < 0.0
        {
            return Err(RepoError::Validation("price must not be negative".into()));
        }
        if let Some(stock) = data.stock
            && stock < 0
        {
            return Err(RepoError::Validation("stock must not be negative".into()));
        }

        let mut set_parts: Vec<&str> = Vec::new();
        if data.title.is_some() {
            set_parts.push("title = $title");
        }
        if data.description.is_some() {
            set_parts.push("description = $description");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if data.category.is_some() {
            set_parts.push("category = $category");
        }
        if data.delivery_time_estimate.is_some() {
            set_parts.push("delivery_time_estimate = $delivery_time_estimate");
        }
        if data.stock.is_some() {
            set_parts.push("stock = $stock");
        }
        if data.images.is_some() {
            set_parts.push("images = $images");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")));
        }
        set_parts.push("updated_at = $now");

        let query_str = format!("UPDATE $id SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self
            .base
            .db()
            .query(&query_str)
            .bind(("id", id.clone()))
            .bind(("now", Utc::now()));

        if let Some(v) = data.title {
            query = query.bind(("title", v));
        }
        if let Some(v) = data.description {
            query = query.bind(("description", v));
        }
        if let Some(v) = data.price {
            query = query.bind(("price", v));
        }
        if let Some(v) = data.category {
            query = query.bind(("category", v));
        }
        if let Some(v) = data.delivery_time_estimate {
            query = query.bind(("delivery_time_estimate", v));
        }
        if let Some(v) = data.stock {
            query = query.bind(("stock", v));
        }
        if let Some(v) = data.images {
            query = query.bind(("images", v));
        }

        let products: Vec<Product> = query.await?.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
    }

    /// Hard delete a product
    pub async fn delete(&self, id: &RecordId) -> RepoResult<()> {
        let deleted: Option<Product> = self.base.db().delete(id.clone()).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Product {id} not found")));
        }
        Ok(())
    }
}
