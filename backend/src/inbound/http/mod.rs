//! HTTP inbound adapter exposing REST endpoints.
//!
//! Handlers authenticate through [`session::SessionContext`] and always scope
//! storage calls by the session's user id.

pub mod cache_control;
pub mod community;
pub mod envelope;
pub mod error;
pub mod goals;
pub mod health;
pub mod journal;
pub mod list_query;
pub mod privacy;
pub mod routes;
pub mod schemas;
pub mod session;
pub mod settings;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
