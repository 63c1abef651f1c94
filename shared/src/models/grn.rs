//! Goods Received Note (GRN) models
//!
//! A GRN records a delivery from a supplier into a store. It is edited
//! freely while DRAFT; posting creates one stock lot per line and is a
//! one-way transition.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// GRN lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrnStatus {
    Draft,
    Posted,
}

impl GrnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrnStatus::Draft => "DRAFT",
            GrnStatus::Posted => "POSTED",
        }
    }

    /// Only DRAFT GRNs may be edited, deleted, or have lines replaced
    pub fn is_editable(&self) -> bool {
        matches!(self, GrnStatus::Draft)
    }
}

/// A goods received note header
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Grn {
    pub id: Uuid,
    pub store_id: Uuid,
    pub supplier_id: Uuid,
    pub grn_no: String,
    pub date: NaiveDate,
    pub status: GrnStatus,
    pub note: Option<String>,
    pub sub_total: rust_decimal::Decimal,
    pub grand_total: rust_decimal::Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line on a GRN
///
/// `line_total` is always server-computed from quantity x unit cost.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GrnLine {
    pub id: Uuid,
    pub grn_id: Uuid,
    pub item_id: Uuid,
    pub qty_received: rust_decimal::Decimal,
    pub unit_cost: rust_decimal::Decimal,
    pub line_total: rust_decimal::Decimal,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_draft_is_editable() {
        assert!(GrnStatus::Draft.is_editable());
        assert!(!GrnStatus::Posted.is_editable());
    }

    #[test]
    fn status_labels_match_stored_values() {
        assert_eq!(GrnStatus::Draft.as_str(), "DRAFT");
        assert_eq!(GrnStatus::Posted.as_str(), "POSTED");
    }
}
