//! Request extractors shared by every route

pub mod auth;
pub mod json;

pub use auth::AuthTenant;
pub use json::ApiJson;
