//! Shared types and models for the Hotel Inventory Management system
//!
//! This crate contains the domain entities, status machines, and pure
//! validation helpers used by the backend API.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
