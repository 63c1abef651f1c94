//! HTTP request handlers

pub mod auth;
pub mod catalog;
pub mod grn;
pub mod health;
pub mod issue;
pub mod reporting;
pub mod request;
pub mod stock;
