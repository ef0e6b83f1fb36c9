//! Order API Handlers
//!
//! Order creation is the authoritative gate: product resolution, the
//! single-seller rule and the delivery check all happen server-side here,
//! then the repository reserves stock and writes the order in one
//! transaction. Status updates go through the state machine in
//! `db::models::order` before touching storage.

use axum::{
    Json,
    extract::{Path, State},
};
use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    Order, OrderCreateRequest, OrderLine, OrderStatus, OrderStatusRequest, OrderView, Requester,
    Role, TransitionError, authorize_transition,
};
use crate::delivery;
use crate::notify::OrderStatusEvent;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

/// POST /api/orders - place an order (buyer only)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderCreateRequest>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    if !user.is_buyer() {
        return Err(AppError::forbidden("Only buyers can place orders"));
    }
    if payload.products.is_empty() {
        return Err(AppError::validation("Order must contain at least one product"));
    }
    validate_optional_text(&payload.comment, "comment", MAX_NOTE_LEN)?;

    let buyer_id = user.record_id().map_err(|_| AppError::unauthorized())?;
    let buyer = state
        .accounts()
        .find_by_id(&buyer_id)
        .await?
        .ok_or_else(|| AppError::not_found("Account not found"))?;

    // Resolve every cart entry and pin the unit price
    let mut lines: Vec<OrderLine> = Vec::with_capacity(payload.products.len());
    let mut seller: Option<RecordId> = None;
    for entry in &payload.products {
        if entry.quantity <= 0 {
            return Err(AppError::validation("Quantity must be at least 1"));
        }

        let product = state
            .products()
            .find_by_id_str(&entry.product_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Product {} not found", entry.product_id))
            })?;

        // Single-seller rule: every line must belong to the same seller
        match &seller {
            None => seller = Some(product.seller.clone()),
            Some(existing) if *existing != product.seller => {
                return Err(AppError::validation(
                    "All products in an order must belong to the same seller",
                ));
            }
            Some(_) => {}
        }

        let product_id = product
            .id
            .ok_or_else(|| AppError::internal("Product record has no id"))?;
        lines.push(OrderLine {
            product: product_id,
            quantity: entry.quantity,
            unit_price: product.price,
        });
    }

    let seller_id = match seller {
        Some(s) => s,
        None => return Err(AppError::validation("Order must contain at least one product")),
    };

    let seller_account = state
        .accounts()
        .find_by_id(&seller_id)
        .await?
        .ok_or_else(|| AppError::not_found("Seller not found"))?;

    delivery::check_delivery(buyer.location(), seller_account.service_area.as_deref())?;

    let order = state
        .orders()
        .create_pending(
            buyer_id,
            seller_id,
            lines,
            payload.comment.unwrap_or_default(),
        )
        .await?;

    tracing::info!(order = ?order.id, total = order.total_price, "order placed");
    Ok(ok_with_message(order.into(), "Order placed"))
}

/// GET /api/orders - the requester's own orders, scoped by role: buyers see
/// what they bought, sellers see what they sold.
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<OrderView>>>> {
    let id = user.record_id().map_err(|_| AppError::unauthorized())?;
    let orders = match user.role {
        Role::Buyer => state.orders().find_by_buyer(&id).await?,
        Role::Seller => state.orders().find_by_seller(&id).await?,
    };
    Ok(ok(orders.into_iter().map(Into::into).collect()))
}

/// GET /api/orders/user/{user_id} - same scope as the bare list, but only
/// for the requester's own id. Kept for client compatibility.
pub async fn list_for_user(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(user_id): Path<String>,
) -> AppResult<Json<AppResponse<Vec<OrderView>>>> {
    let id = user.record_id().map_err(|_| AppError::unauthorized())?;
    let requested = crate::db::repository::parse_record_id("account", &user_id)
        .map_err(|_| AppError::validation(format!("Invalid account id '{user_id}'")))?;
    if requested != id {
        return Err(AppError::forbidden("You can only view your own orders"));
    }

    let orders = match user.role {
        Role::Buyer => state.orders().find_by_buyer(&id).await?,
        Role::Seller => state.orders().find_by_seller(&id).await?,
    };
    Ok(ok(orders.into_iter().map(Into::into).collect()))
}

/// GET /api/orders/{id} - one order, participants only
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let (order, _requester) = require_participant(&state, &user, &id).await?;
    Ok(ok(order.into()))
}

/// PUT /api/orders/{id} - request a status transition
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<OrderStatusRequest>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let requested = OrderStatus::parse(&payload.status).ok_or_else(|| {
        AppError::validation(format!(
            "Unknown status '{}' (expected pending, shipping, delivered or cancelled)",
            payload.status
        ))
    })?;

    let (order, requester) = require_participant(&state, &user, &id).await?;
    authorize_transition(order.status, requested, requester).map_err(transition_error)?;

    let order_id = order
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Order record has no id"))?;
    let updated = state
        .orders()
        .transition(&order_id, order.status, requested, &order.lines)
        .await?;

    // Sellers moving an order forward notify the buyer. Cancellations and
    // buyer-initiated changes stay quiet
    if requester == Requester::OwningSeller && updated.status != OrderStatus::Cancelled {
        state.notifier.order_status_changed(OrderStatusEvent {
            order_id: order_id.clone(),
            buyer: updated.buyer.clone(),
            seller: updated.seller.clone(),
            status: updated.status,
        });
    }

    tracing::info!(order = %order_id, from = %order.status, to = %updated.status, "order status changed");
    Ok(ok_with_message(updated.into(), "Order updated"))
}

/// DELETE /api/orders/{id} - remove an order record, restoring stock unless
/// it was already cancelled
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    let (order, _requester) = require_participant(&state, &user, &id).await?;
    let order_id = order
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Order record has no id"))?;

    state.orders().delete(&order_id, &order.lines).await?;
    tracing::info!(order = %order_id, "order deleted");
    Ok(ok_with_message((), "Order deleted"))
}

/// Load an order and classify the requester; strangers get 403.
async fn require_participant(
    state: &ServerState,
    user: &CurrentUser,
    id: &str,
) -> Result<(Order, Requester), AppError> {
    let account_id = user.record_id().map_err(|_| AppError::unauthorized())?;
    let order = state
        .orders()
        .find_by_id_str(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;

    let requester = order.requester_for(&account_id, user.role);
    if requester == Requester::Other {
        return Err(AppError::forbidden("You are not a party to this order"));
    }
    Ok((order, requester))
}

fn transition_error(e: TransitionError) -> AppError {
    match e {
        TransitionError::NotAuthorized => AppError::forbidden(e.to_string()),
        TransitionError::Terminal(_) => AppError::conflict(e.to_string()),
        TransitionError::InvalidTarget { .. } | TransitionError::BuyerRestriction => {
            AppError::validation(e.to_string())
        }
    }
}
