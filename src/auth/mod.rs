//! Authentication Module
//!
//! JWT issuance and validation plus the request extractor that turns a
//! bearer token into a [`CurrentUser`].

pub mod extractor;
pub mod jwt;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
