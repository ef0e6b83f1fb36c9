//! Flag API Module

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/flags", flag_routes())
}

fn flag_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/reported/{user_id}", get(handler::list_for_reported))
        .route("/{id}/status", put(handler::update_status))
        .route("/{id}", axum::routing::delete(handler::delete))
}
