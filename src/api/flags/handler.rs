//! Flag API Handlers
//!
//! Reports are always anchored to an order, and the direction of a report
//! must match the reporter's role on that order: sellers flag their buyer,
//! buyers flag their seller. The repository enforces the one-flag-per-type
//! rule and keeps the reported account's counter in step.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    Flag, FlagCreateRequest, FlagStatus, FlagStatusRequest, FlagType, FlagView,
};
use crate::db::repository::parse_record_id;
use crate::utils::validation::{MAX_NOTE_LEN, validate_required_text};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

/// POST /api/flags - file a report against the other party of an order
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<FlagCreateRequest>,
) -> AppResult<Json<AppResponse<Flag>>> {
    validate_required_text(&payload.reason, "reason", MAX_NOTE_LEN)?;

    let reporter = user.record_id().map_err(|_| AppError::unauthorized())?;
    let reported = parse_record_id("account", &payload.reported_id)
        .map_err(|_| AppError::validation(format!("Invalid account id '{}'", payload.reported_id)))?;
    let order_id = parse_record_id("order", &payload.order_id)
        .map_err(|_| AppError::validation(format!("Invalid order id '{}'", payload.order_id)))?;

    let order = state
        .orders()
        .find_by_id(&order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", payload.order_id)))?;

    // The report direction must match the reporter's role on this order
    match payload.kind {
        FlagType::SellerFlaggingBuyer => {
            if order.seller != reporter {
                return Err(AppError::forbidden(
                    "Only the seller of this order can flag its buyer",
                ));
            }
            if order.buyer != reported {
                return Err(AppError::validation(
                    "Reported account is not the buyer of this order",
                ));
            }
        }
        FlagType::BuyerFlaggingSeller => {
            if order.buyer != reporter {
                return Err(AppError::forbidden(
                    "Only the buyer of this order can flag its seller",
                ));
            }
            if order.seller != reported {
                return Err(AppError::validation(
                    "Reported account is not the seller of this order",
                ));
            }
        }
    }

    let flag = state
        .flags()
        .create(reporter, reported, order_id, payload.reason, payload.kind)
        .await?;

    tracing::info!(flag = ?flag.id, kind = %flag.kind.as_str(), "flag filed");
    Ok(ok_with_message(flag, "Report filed"))
}

/// GET /api/flags/reported/{user_id} - all reports naming one account
pub async fn list_for_reported(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(user_id): Path<String>,
) -> AppResult<Json<AppResponse<Vec<FlagView>>>> {
    let reported = parse_record_id("account", &user_id)
        .map_err(|_| AppError::validation(format!("Invalid account id '{user_id}'")))?;
    let flags = state.flags().find_for_reported(&reported).await?;
    Ok(ok(flags))
}

/// PUT /api/flags/{id}/status - reporter resolves or reopens their report
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<FlagStatusRequest>,
) -> AppResult<Json<AppResponse<Flag>>> {
    let status = FlagStatus::parse(&payload.status).ok_or_else(|| {
        AppError::validation(format!(
            "Unknown status '{}' (expected open or resolved)",
            payload.status
        ))
    })?;

    let flag = require_own_flag(&state, &user, &id).await?;
    let flag_id = flag
        .id
        .ok_or_else(|| AppError::internal("Flag record has no id"))?;

    let updated = state.flags().update_status(&flag_id, status).await?;
    Ok(ok_with_message(updated, "Report updated"))
}

/// DELETE /api/flags/{id} - reporter withdraws their report
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    let flag = require_own_flag(&state, &user, &id).await?;
    let flag_id = flag
        .id
        .ok_or_else(|| AppError::internal("Flag record has no id"))?;

    state.flags().delete(&flag_id).await?;
    tracing::info!(flag = %flag_id, "flag withdrawn");
    Ok(ok_with_message((), "Report withdrawn"))
}

async fn require_own_flag(
    state: &ServerState,
    user: &CurrentUser,
    id: &str,
) -> Result<Flag, AppError> {
    let reporter = user.record_id().map_err(|_| AppError::unauthorized())?;
    let flag = state
        .flags()
        .find_by_id_str(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Flag {id} not found")))?;

    if flag.reporter != reporter {
        return Err(AppError::forbidden("You did not file this report"));
    }
    Ok(flag)
}
