//! Auth API Handlers
//!
//! Registration and login. Login failures share one message and one timing
//! profile whether the email exists or not.

use std::time::Duration;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{Account, AccountCreate, AccountView, Role};
use crate::utils::validation::{
    format_validation_errors, validate_password_strength, validate_phone,
};
use crate::utils::{AppError, AppResponse, AppResult, ok_with_message};

/// Minimum time a failed login takes, regardless of the failure reason
const LOGIN_FAILURE_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 50, message = "Name must be 2-50 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    #[validate(length(max = 254, message = "Email is too long"))]
    pub email: String,
    #[validate(custom(function = validate_password_strength))]
    pub password: String,
    /// "buyer" | "seller"
    pub role: String,
    #[validate(length(
        min = 10,
        max = 500,
        message = "Address must be at least 10 characters"
    ))]
    pub address: String,
    #[validate(custom(function = validate_phone))]
    pub phone: String,
    pub governate: Option<String>,
    pub store_name: Option<String>,
    pub service_area: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub account: AccountView,
}

/// POST /api/auth/register - create an account and issue a token
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<AppResponse<AuthResponse>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(format_validation_errors(&e)))?;

    let role = Role::parse(&payload.role)
        .ok_or_else(|| AppError::validation("Role must be 'buyer' or 'seller'"))?;

    // Buyers need a resolvable location before they can ever order
    if role == Role::Buyer
        && payload
            .governate
            .as_deref()
            .is_none_or(|g| g.trim().is_empty())
    {
        return Err(AppError::validation("Buyers must provide a governate"));
    }

    let account = state
        .accounts()
        .create(AccountCreate {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            role,
            address: payload.address,
            phone: payload.phone,
            governate: payload.governate,
            store_name: payload.store_name,
            service_area: payload.service_area,
        })
        .await?;

    let token = issue_token(&state, &account)?;

    tracing::info!(email = %account.email, role = %account.role, "account registered");
    Ok(ok_with_message(
        AuthResponse {
            token,
            account: account.into(),
        },
        "Account created",
    ))
}

/// POST /api/auth/login - verify credentials and issue a token
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AppResponse<AuthResponse>>> {
    let account = state.accounts().find_auth_by_email(&payload.email).await?;

    let verified = match &account {
        Some(account) => account
            .verify_password(&payload.password)
            .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?,
        None => false,
    };

    if !verified {
        tracing::warn!(email = %payload.email, "failed login attempt");
        tokio::time::sleep(LOGIN_FAILURE_DELAY).await;
        return Err(AppError::invalid_credentials());
    }

    let mut account = match account {
        Some(a) => a,
        None => return Err(AppError::invalid_credentials()),
    };
    account.password = None;
    account.smtp_app_password = None;

    let token = issue_token(&state, &account)?;

    tracing::info!(email = %account.email, "login succeeded");
    Ok(ok_with_message(
        AuthResponse {
            token,
            account: account.into(),
        },
        "Login successful",
    ))
}

fn issue_token(state: &ServerState, account: &Account) -> Result<String, AppError> {
    let id = account
        .id
        .as_ref()
        .map(|t| t.to_string())
        .ok_or_else(|| AppError::internal("Account record has no id"))?;
    state
        .jwt_service
        .generate_token(&id, &account.name, &account.email, account.role)
        .map_err(|e| AppError::internal(format!("Failed to issue token: {e}")))
}
