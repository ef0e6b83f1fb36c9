//! Shared fixtures for the integration tests

use souk_server::db::DbService;
use souk_server::db::models::{AccountCreate, Category, ProductCreate, Role};
use souk_server::db::repository::{
    AccountRepository, FlagRepository, NotificationRepository, OrderRepository, ProductRepository,
};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

pub struct TestEnv {
    pub db: Surreal<Db>,
    pub accounts: AccountRepository,
    pub products: ProductRepository,
    pub orders: OrderRepository,
    pub flags: FlagRepository,
    pub notifications: NotificationRepository,
}

impl TestEnv {
    pub async fn new() -> Self {
        let service = DbService::memory().await.expect("in-memory db");
        Self::with_db(service.db)
    }

    /// Wrap repositories around an existing connection (shared with a
    /// running `ServerState` in the HTTP-level tests)
    pub fn with_db(db: Surreal<Db>) -> Self {
        Self {
            accounts: AccountRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            flags: FlagRepository::new(db.clone()),
            notifications: NotificationRepository::new(db.clone()),
            db,
        }
    }

    pub async fn seed_buyer(&self, email: &str, governate: &str) -> RecordId {
        let account = self
            .accounts
            .create(AccountCreate {
                name: "Test Buyer".to_string(),
                email: email.to_string(),
                password: "Secret123".to_string(),
                role: Role::Buyer,
                address: "12 Test Street, Somewhere".to_string(),
                phone: "01001234567".to_string(),
                governate: Some(governate.to_string()),
                store_name: None,
                service_area: None,
            })
            .await
            .expect("seed buyer");
        account.id.expect("buyer id")
    }

    pub async fn seed_seller(&self, email: &str, service_area: Option<&str>) -> RecordId {
        let account = self
            .accounts
            .create(AccountCreate {
                name: "Test Seller".to_string(),
                email: email.to_string(),
                password: "Secret123".to_string(),
                role: Role::Seller,
                address: "99 Market Road, Downtown".to_string(),
                phone: "01007654321".to_string(),
                governate: None,
                store_name: Some("Test Store".to_string()),
                service_area: service_area.map(|s| s.to_string()),
            })
            .await
            .expect("seed seller");
        account.id.expect("seller id")
    }

    pub async fn seed_product(&self, seller: &RecordId, price: f64, stock: i64) -> RecordId {
        let product = self
            .products
            .create(
                seller.clone(),
                ProductCreate {
                    title: "Test Product".to_string(),
                    description: None,
                    price,
                    category: Category::Other,
                    delivery_time_estimate: None,
                    stock,
                    images: vec![],
                },
            )
            .await
            .expect("seed product");
        product.id.expect("product id")
    }

    pub async fn stock_of(&self, product: &RecordId) -> i64 {
        self.products
            .find_by_id(product)
            .await
            .expect("product lookup")
            .expect("product exists")
            .stock
    }

    pub async fn flags_count_of(&self, account: &RecordId) -> i64 {
        self.accounts
            .find_by_id(account)
            .await
            .expect("account lookup")
            .expect("account exists")
            .flags_count
    }
}
