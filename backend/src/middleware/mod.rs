//! Middleware for the Hotel Inventory Management API

pub mod auth;

pub use auth::{auth_middleware, AuthUser, CurrentUser};
