//! Souk Server
//!
//! Multi-vendor marketplace backend: accounts with buyer/seller roles, a
//! public product catalog, a transactional order workflow with delivery
//! eligibility checks, an abuse report ledger and buyer notifications.
//!
//! Storage is an embedded SurrealDB instance under the configured work
//! directory; the HTTP surface is an axum router returning a uniform
//! `{code, message, data}` envelope.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod delivery;
pub mod notify;
pub mod utils;

pub use crate::core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse, AppResult};

/// Initialize logging from the loaded configuration. Call once, before
/// anything else logs.
pub fn setup_logging(config: &Config) {
    let log_dir = config.log_dir();
    if config.log_to_file {
        utils::init_logger_with_file(Some(&config.log_level), log_dir.to_str());
    } else {
        utils::init_logger_with_file(Some(&config.log_level), None);
    }
}
