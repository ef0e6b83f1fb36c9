//! Account Repository
//!
//! Secrets policy: `password` only comes back from `find_auth_by_email`
//! (login), and `smtp_app_password` only from `find_mail_credentials`
//! (notification dispatcher). Every other read OMITs both columns.

use chrono::Utc;
use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Account, AccountCreate, AccountUpdate, Role};

pub const ACCOUNT_TABLE: &str = "account";

/// Seller mail credential, scoped to the notification dispatcher
#[derive(Debug, Clone, Deserialize)]
pub struct MailCredentials {
    pub email: String,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub smtp_app_password: Option<String>,
}

#[derive(Clone)]
pub struct AccountRepository {
    base: BaseRepository,
}

impl AccountRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Register a new account
    pub async fn create(&self, data: AccountCreate) -> RepoResult<Account> {
        if self.find_auth_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "An account with email '{}' already exists",
                data.email
            )));
        }

        let password = Account::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {e}")))?;

        let now = Utc::now();
        let account = Account {
            id: None,
            name: data.name,
            email: data.email.to_lowercase(),
            password: Some(password),
            role: data.role,
            address: data.address,
            phone: data.phone,
            governate: data.governate,
            store_name: data.store_name,
            service_area: data.service_area,
            smtp_app_password: None,
            flags_count: 0,
            created_at: Some(now),
            updated_at: Some(now),
        };

        let created: Option<Account> = self
            .base
            .db()
            .create(ACCOUNT_TABLE)
            .content(account)
            .await
            .map_err(|e| {
                // The unique email index is the backstop for races on the
                // pre-check above
                let msg = e.to_string();
                if msg.contains("uniq_account_email") {
                    RepoError::Duplicate("An account with this email already exists".to_string())
                } else {
                    RepoError::Database(msg)
                }
            })?;

        let mut created =
            created.ok_or_else(|| RepoError::Database("Failed to create account".to_string()))?;
        created.password = None;
        Ok(created)
    }

    /// Find by id, secrets omitted
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Account>> {
        let accounts: Vec<Account> = self
            .base
            .db()
            .query("SELECT * OMIT password, smtp_app_password FROM $id")
            .bind(("id", id.clone()))
            .await?
            .take(0)?;
        Ok(accounts.into_iter().next())
    }

    /// Find by API-supplied id string, secrets omitted
    pub async fn find_by_id_str(&self, id: &str) -> RepoResult<Option<Account>> {
        let record = parse_record_id(ACCOUNT_TABLE, id)?;
        self.find_by_id(&record).await
    }

    /// Full row including the password hash. Login only.
    pub async fn find_auth_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        let email = email.to_lowercase();
        let accounts: Vec<Account> = self
            .base
            .db()
            .query("SELECT * FROM account WHERE email = $email LIMIT 1")
            .bind(("email", email))
            .await?
            .take(0)?;
        Ok(accounts.into_iter().next())
    }

    /// Mail credential lookup. Notification dispatcher only.
    pub async fn find_mail_credentials(&self, id: &RecordId) -> RepoResult<Option<MailCredentials>> {
        let creds: Vec<MailCredentials> = self
            .base
            .db()
            .query("SELECT email, store_name, smtp_app_password FROM $id")
            .bind(("id", id.clone()))
            .await?
            .take(0)?;
        Ok(creds.into_iter().next())
    }

    /// All seller accounts (public directory), secrets omitted
    pub async fn find_sellers(&self) -> RepoResult<Vec<Account>> {
        let sellers: Vec<Account> = self
            .base
            .db()
            .query(
                "SELECT * OMIT password, smtp_app_password FROM account \
                 WHERE role = 'seller' ORDER BY name",
            )
            .await?
            .take(0)?;
        Ok(sellers)
    }

    /// Update profile fields. Role and email are not touchable here.
    pub async fn update(&self, id: &RecordId, data: AccountUpdate) -> RepoResult<Account> {
        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.address.is_some() {
            set_parts.push("address = $address");
        }
        if data.phone.is_some() {
            set_parts.push("phone = $phone");
        }
        if data.governate.is_some() {
            set_parts.push("governate = $governate");
        }
        if data.store_name.is_some() {
            set_parts.push("store_name = $store_name");
        }
        if data.service_area.is_some() {
            set_parts.push("service_area = $service_area");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Account {id} not found")));
        }
        set_parts.push("updated_at = $now");

        let query_str = format!("UPDATE $id SET {}", set_parts.join(", "));
        let mut query = self
            .base
            .db()
            .query(&query_str)
            .bind(("id", id.clone()))
            .bind(("now", Utc::now()));

        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.address {
            query = query.bind(("address", v));
        }
        if let Some(v) = data.phone {
            query = query.bind(("phone", v));
        }
        if let Some(v) = data.governate {
            query = query.bind(("governate", v));
        }
        if let Some(v) = data.store_name {
            query = query.bind(("store_name", v));
        }
        if let Some(v) = data.service_area {
            query = query.bind(("service_area", v));
        }

        query.await?.check()?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Account {id} not found")))
    }

    /// Store the seller's outbound-mail app password (write-only secret)
    pub async fn set_mail_credentials(
        &self,
        id: &RecordId,
        app_password: Option<String>,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $id SET smtp_app_password = $pass, updated_at = $now")
            .bind(("id", id.clone()))
            .bind(("pass", app_password))
            .bind(("now", Utc::now()))
            .await?
            .check()?;
        Ok(())
    }

    /// Role of an account, if it exists
    pub async fn role_of(&self, id: &RecordId) -> RepoResult<Option<Role>> {
        Ok(self.find_by_id(id).await?.map(|a| a.role))
    }
}
