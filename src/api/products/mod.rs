//! Product API Module
//!
//! Catalog reads are public; writes require a seller token and ownership of
//! the product.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", product_routes())
}

fn product_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/categories", get(handler::list_categories))
        .route("/mine", get(handler::list_mine))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/stock", axum::routing::put(handler::update_stock))
        .route("/{id}/delivery-check", get(handler::delivery_check))
        .route("/category/{category}", get(handler::list_by_category))
        .route("/by-seller/{seller_id}", get(handler::list_by_seller))
}
