//! Server State
//!
//! Shared handle passed to every handler. Cloning is shallow: the database
//! connection, JWT service and notification queue are all reference-counted
//! internally.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{
    AccountRepository, FlagRepository, NotificationRepository, OrderRepository, ProductRepository,
};
use crate::notify::NotifyService;
use crate::utils::AppError;

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
    pub notifier: NotifyService,
}

impl ServerState {
    /// Initialize everything the server needs: work directory, database,
    /// JWT service and the notification worker.
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db_path = config.database_dir().join("souk.db");
        let db_service = DbService::new(&db_path.to_string_lossy()).await?;
        let db = db_service.db;

        let jwt_service = Arc::new(JwtService::new());
        let notifier = NotifyService::spawn(db.clone(), config.smtp());

        Ok(Self {
            config: config.clone(),
            db,
            jwt_service,
            notifier,
        })
    }

    /// In-memory variant for tests
    pub async fn for_tests() -> Result<Self, AppError> {
        let db_service = DbService::memory().await?;
        let db = db_service.db;

        let config = Config {
            work_dir: String::new(),
            http_port: 0,
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            log_to_file: false,
            smtp: None,
        };

        let jwt_service = Arc::new(JwtService::new());
        let notifier = NotifyService::spawn(db.clone(), config.smtp());

        Ok(Self {
            config,
            db,
            jwt_service,
            notifier,
        })
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    pub fn accounts(&self) -> AccountRepository {
        AccountRepository::new(self.db.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.db.clone())
    }

    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.db.clone())
    }

    pub fn flags(&self) -> FlagRepository {
        FlagRepository::new(self.db.clone())
    }

    pub fn notifications(&self) -> NotificationRepository {
        NotificationRepository::new(self.db.clone())
    }
}
