//! Account Model
//!
//! One table for both marketplace roles. Buyers carry a location
//! (governate/address) used by the delivery check; sellers carry the store
//! profile, the service-area string and the outbound-mail credential.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Account role tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "buyer" => Some(Role::Buyer),
            "seller" => Some(Role::Seller),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account entity
///
/// `password` and `smtp_app_password` are secrets: every repository read
/// except the login lookup and the dispatcher-scoped credential lookup
/// `OMIT`s them, so they deserialize as `None` on ordinary paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: Role,
    pub address: String,
    pub phone: String,
    /// Buyer location used by the delivery check (governate preferred)
    #[serde(default)]
    pub governate: Option<String>,
    // Seller-specific fields
    #[serde(default)]
    pub store_name: Option<String>,
    /// Comma-separated delivery areas; empty/absent means ships everywhere
    #[serde(default)]
    pub service_area: Option<String>,
    /// Gmail app password for the notification dispatcher. Never serialized
    /// into API responses, never selected outside the dispatcher path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smtp_app_password: Option<String>,
    /// Denormalized count of open+resolved reports naming this account
    #[serde(default)]
    pub flags_count: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Hash a plaintext password with argon2id
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Verify a plaintext password against the stored hash
    ///
    /// Returns `false` when the account row was loaded without the password
    /// column (every non-login read path).
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        let Some(stored) = &self.password else {
            return Ok(false);
        };
        let parsed = PasswordHash::new(stored)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Effective buyer location for the delivery check
    pub fn location(&self) -> Option<&str> {
        crate::delivery::resolve_buyer_location(
            self.governate.as_deref(),
            Some(self.address.as_str()),
        )
    }
}

/// Internal creation payload (built by the register handler)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub address: String,
    pub phone: String,
    pub governate: Option<String>,
    pub store_name: Option<String>,
    pub service_area: Option<String>,
}

/// Profile update payload: only the mutable profile fields. Role, email and
/// the flag counter are not updatable through this path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub governate: Option<String>,
    pub store_name: Option<String>,
    pub service_area: Option<String>,
}

/// Public account view returned by the API (no secrets)
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub address: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub governate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_area: Option<String>,
    pub flags_count: i64,
}

impl From<Account> for AccountView {
    fn from(a: Account) -> Self {
        Self {
            id: a.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            name: a.name,
            email: a.email,
            role: a.role,
            address: a.address,
            phone: a.phone,
            governate: a.governate,
            store_name: a.store_name,
            service_area: a.service_area,
            flags_count: a.flags_count,
        }
    }
}
