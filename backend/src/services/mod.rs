//! Business logic services

pub mod auth;
pub mod catalog;
pub mod grn;
pub mod issue;
pub mod numbering;
pub mod reporting;
pub mod request;
pub mod stock;

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use grn::GrnService;
pub use issue::IssueService;
pub use numbering::{DocumentNumbering, UuidNumbering};
pub use reporting::ReportingService;
pub use request::RequestService;
pub use stock::StockService;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Fail with NotFound unless a row with this id exists in the given table.
/// `table` is always a literal supplied by service code, never user input.
pub(crate) async fn exists(db: &PgPool, table: &str, id: Uuid, entity: &str) -> AppResult<()> {
    let found: Option<(Uuid,)> =
        sqlx::query_as(&format!("SELECT id FROM {} WHERE id = $1", table))
            .bind(id)
            .fetch_optional(db)
            .await?;
    found
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound(entity.to_string()))
}
