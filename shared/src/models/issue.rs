//! Issue models
//!
//! An issue is the fulfillment transaction that moves approved, requested
//! quantity out of stock lots to a department.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An issue of stock against a request
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: Uuid,
    pub store_id: Uuid,
    pub department_id: Uuid,
    pub request_id: Uuid,
    pub issue_no: String,
    pub issued_by: Uuid,
    pub date: NaiveDate,
    pub grand_total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A line on an issue
///
/// The unit cost is frozen from the specific stock lot the line drew from,
/// not looked up item-wide: two issues of the same item on the same day can
/// carry different unit costs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IssueLine {
    pub id: Uuid,
    pub issue_id: Uuid,
    pub request_line_id: Uuid,
    pub item_id: Uuid,
    pub stock_lot_id: Uuid,
    pub grn_no: String,
    pub qty: Decimal,
    pub unit_cost: Decimal,
    pub line_total: Decimal,
    pub created_at: DateTime<Utc>,
}
