//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    Account, Category, Product, ProductCreate, ProductUpdate, ProductView, SellerSummary,
};
use crate::delivery;
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_TITLE_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
}

/// GET /api/products - public catalog, optionally filtered by category
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<AppResponse<Vec<ProductView>>>> {
    let repo = state.products();
    let products = match params.category.as_deref() {
        Some(raw) => {
            let category = Category::parse(raw)
                .ok_or_else(|| AppError::validation(format!("Unknown category '{raw}'")))?;
            repo.find_by_category(category).await?
        }
        None => repo.find_all().await?,
    };

    Ok(ok(products
        .into_iter()
        .map(|p| ProductView::from_product(p, None))
        .collect()))
}

/// GET /api/products/category/{category} - path-style category filter
pub async fn list_by_category(
    State(state): State<ServerState>,
    Path(category): Path<String>,
) -> AppResult<Json<AppResponse<Vec<ProductView>>>> {
    let category = Category::parse(&category)
        .ok_or_else(|| AppError::validation(format!("Unknown category '{category}'")))?;
    let products = state.products().find_by_category(category).await?;
    Ok(ok(products
        .into_iter()
        .map(|p| ProductView::from_product(p, None))
        .collect()))
}

/// GET /api/products/categories - the closed category list
pub async fn list_categories() -> Json<AppResponse<Vec<&'static str>>> {
    ok(Category::ALL.iter().map(|c| c.as_str()).collect())
}

/// GET /api/products/{id} - one product with seller summary
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<ProductView>>> {
    let product = state
        .products()
        .find_by_id_str(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id} not found")))?;

    let seller_info = state
        .accounts()
        .find_by_id(&product.seller)
        .await?
        .map(seller_summary);

    Ok(ok(ProductView::from_product(product, seller_info)))
}

/// GET /api/products/mine - the requesting seller's own products
pub async fn list_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<ProductView>>>> {
    if !user.is_seller() {
        return Err(AppError::forbidden("Only sellers have a product list"));
    }
    let seller = user.record_id().map_err(|_| AppError::unauthorized())?;
    let products = state.products().find_by_seller(&seller).await?;
    Ok(ok(products
        .into_iter()
        .map(|p| ProductView::from_product(p, None))
        .collect()))
}

/// GET /api/products/by-seller/{seller_id} - one seller's public catalog
pub async fn list_by_seller(
    State(state): State<ServerState>,
    Path(seller_id): Path<String>,
) -> AppResult<Json<AppResponse<Vec<ProductView>>>> {
    let seller = state
        .accounts()
        .find_by_id_str(&seller_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Seller {seller_id} not found")))?;
    let seller_id = seller
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Seller record has no id"))?;

    let products = state.products().find_by_seller(&seller_id).await?;
    let summary = seller_summary(seller);
    Ok(ok(products
        .into_iter()
        .map(|p| ProductView::from_product(p, Some(summary.clone())))
        .collect()))
}

/// POST /api/products - create a product (seller only)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<AppResponse<ProductView>>> {
    if !user.is_seller() {
        return Err(AppError::forbidden("Only sellers can create products"));
    }
    validate_required_text(&payload.title, "title", MAX_TITLE_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let seller = user.record_id().map_err(|_| AppError::unauthorized())?;
    let product = state.products().create(seller, payload).await?;

    tracing::info!(product = ?product.id, "product created");
    Ok(ok_with_message(
        ProductView::from_product(product, None),
        "Product created",
    ))
}

/// PUT /api/products/{id} - update an owned product
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<AppResponse<ProductView>>> {
    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_TITLE_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let product = require_owned_product(&state, &user, &id).await?;
    let product_id = product
        .id
        .ok_or_else(|| AppError::internal("Product record has no id"))?;

    let updated = state.products().update(&product_id, payload).await?;
    Ok(ok_with_message(
        ProductView::from_product(updated, None),
        "Product updated",
    ))
}

/// DELETE /api/products/{id} - remove an owned product
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    let product = require_owned_product(&state, &user, &id).await?;
    let product_id = product
        .id
        .ok_or_else(|| AppError::internal("Product record has no id"))?;

    state.products().delete(&product_id).await?;
    tracing::info!(product = %product_id, "product deleted");
    Ok(ok_with_message((), "Product deleted"))
}

#[derive(Debug, Deserialize)]
pub struct StockUpdateRequest {
    pub stock: i64,
}

/// PUT /api/products/{id}/stock - adjust stock on an owned product
pub async fn update_stock(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<StockUpdateRequest>,
) -> AppResult<Json<AppResponse<ProductView>>> {
    let product = require_owned_product(&state, &user, &id).await?;
    let product_id = product
        .id
        .ok_or_else(|| AppError::internal("Product record has no id"))?;

    let updated = state
        .products()
        .update(
            &product_id,
            ProductUpdate {
                stock: Some(payload.stock),
                ..Default::default()
            },
        )
        .await?;
    Ok(ok_with_message(
        ProductView::from_product(updated, None),
        "Stock updated",
    ))
}

#[derive(Debug, Serialize)]
pub struct DeliveryCheck {
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// GET /api/products/{id}/delivery-check - would an order for this product
/// pass the delivery check right now?
pub async fn delivery_check(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<DeliveryCheck>>> {
    let product = state
        .products()
        .find_by_id_str(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id} not found")))?;

    let buyer_id = user.record_id().map_err(|_| AppError::unauthorized())?;
    let buyer = state
        .accounts()
        .find_by_id(&buyer_id)
        .await?
        .ok_or_else(|| AppError::not_found("Account not found"))?;

    let seller = state
        .accounts()
        .find_by_id(&product.seller)
        .await?
        .ok_or_else(|| AppError::not_found("Seller not found"))?;

    let check = delivery::check_delivery(buyer.location(), seller.service_area.as_deref());
    let result = match check {
        Ok(()) => DeliveryCheck {
            eligible: true,
            reason: None,
        },
        Err(e) => {
            // Same client-facing wording as the order-creation rejection
            let reason = match AppError::from(e) {
                AppError::Validation(msg) => msg,
                other => other.to_string(),
            };
            DeliveryCheck {
                eligible: false,
                reason: Some(reason),
            }
        }
    };
    Ok(ok(result))
}

async fn require_owned_product(
    state: &ServerState,
    user: &CurrentUser,
    id: &str,
) -> Result<Product, AppError> {
    if !user.is_seller() {
        return Err(AppError::forbidden("Only sellers can modify products"));
    }
    let seller = user.record_id().map_err(|_| AppError::unauthorized())?;

    let product = state
        .products()
        .find_by_id_str(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id} not found")))?;

    if product.seller != seller {
        return Err(AppError::forbidden("You do not own this product"));
    }
    Ok(product)
}

fn seller_summary(account: Account) -> SellerSummary {
    SellerSummary {
        id: account.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
        name: account.name,
        email: account.email,
        store_name: account.store_name,
        service_area: account.service_area,
        flags_count: account.flags_count,
    }
}
