//! Account API Module

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/accounts", account_routes())
}

fn account_routes() -> Router<ServerState> {
    Router::new()
        .route("/me", get(handler::me).put(handler::update_me))
        .route("/me/mail-credentials", put(handler::set_mail_credentials))
        .route("/me/notifications", get(handler::list_notifications))
        .route(
            "/me/notifications/{id}/read",
            put(handler::mark_notification_read),
        )
        .route("/sellers", get(handler::list_sellers))
        .route("/sellers/{id}", get(handler::get_seller))
}
