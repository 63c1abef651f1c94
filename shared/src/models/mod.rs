//! Domain models for the Hotel Inventory Management system

mod catalog;
mod grn;
mod issue;
mod request;
mod stock_lot;
mod user;

pub use catalog::*;
pub use grn::*;
pub use issue::*;
pub use request::*;
pub use stock_lot::*;
pub use user::*;
