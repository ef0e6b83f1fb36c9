//! Account API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{AccountUpdate, AccountView, NotificationView, Role};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

/// GET /api/accounts/me - the requester's own profile
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<AccountView>>> {
    let id = user.record_id().map_err(|_| AppError::unauthorized())?;
    let account = state
        .accounts()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Account not found"))?;
    Ok(ok(account.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub governate: Option<String>,
    pub store_name: Option<String>,
    pub service_area: Option<String>,
}

/// PUT /api/accounts/me - update the requester's own profile
pub async fn update_me(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProfileUpdateRequest>,
) -> AppResult<Json<AppResponse<AccountView>>> {
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.store_name, "store name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.service_area, "service area", MAX_NOTE_LEN)?;

    if let Some(phone) = &payload.phone {
        crate::utils::validation::validate_phone(phone)
            .map_err(|_| AppError::validation("Phone number must be 10-15 digits"))?;
    }

    // Store profile fields only mean something on seller accounts
    if user.role == Role::Buyer
        && (payload.store_name.is_some() || payload.service_area.is_some())
    {
        return Err(AppError::forbidden(
            "Only sellers can set store name or service area",
        ));
    }

    let id = user.record_id().map_err(|_| AppError::unauthorized())?;
    let account = state
        .accounts()
        .update(
            &id,
            AccountUpdate {
                name: payload.name,
                address: payload.address,
                phone: payload.phone,
                governate: payload.governate,
                store_name: payload.store_name,
                service_area: payload.service_area,
            },
        )
        .await?;

    Ok(ok_with_message(account.into(), "Profile updated"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailCredentialsRequest {
    /// App password for the seller's mail account; null clears it
    pub app_password: Option<String>,
}

/// PUT /api/accounts/me/mail-credentials - store the seller's outbound-mail
/// secret. Write-only: no read path ever returns it.
pub async fn set_mail_credentials(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<MailCredentialsRequest>,
) -> AppResult<Json<AppResponse<()>>> {
    if !user.is_seller() {
        return Err(AppError::forbidden("Only sellers can set mail credentials"));
    }

    let id = user.record_id().map_err(|_| AppError::unauthorized())?;
    state
        .accounts()
        .set_mail_credentials(&id, payload.app_password)
        .await?;

    Ok(ok_with_message((), "Mail credentials updated"))
}

/// GET /api/accounts/me/notifications - the requester's notifications,
/// newest first
pub async fn list_notifications(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<NotificationView>>>> {
    let id = user.record_id().map_err(|_| AppError::unauthorized())?;
    let notifications = state.notifications().find_for_account(&id).await?;
    Ok(ok(notifications.into_iter().map(Into::into).collect()))
}

/// PUT /api/accounts/me/notifications/{id}/read - mark one notification read
pub async fn mark_notification_read(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<NotificationView>>> {
    let account = user.record_id().map_err(|_| AppError::unauthorized())?;
    let notification = state.notifications().mark_read(&id, &account).await?;
    Ok(ok(notification.into()))
}

/// GET /api/accounts/sellers - public seller directory
pub async fn list_sellers(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<AccountView>>>> {
    let sellers = state.accounts().find_sellers().await?;
    Ok(ok(sellers.into_iter().map(Into::into).collect()))
}

/// GET /api/accounts/sellers/{id} - one seller's public profile
pub async fn get_seller(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<AccountView>>> {
    let account = state
        .accounts()
        .find_by_id_str(&id)
        .await?
        .filter(|a| a.role == Role::Seller)
        .ok_or_else(|| AppError::not_found(format!("Seller {id} not found")))?;
    Ok(ok(account.into()))
}
