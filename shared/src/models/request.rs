//! Stock request models and the request status machine
//!
//! Status machine: SUBMITTED -> APPROVED | REJECTED;
//! APPROVED <-> PARTIALLY_ISSUED -> CLOSED.
//! REJECTED and CLOSED are terminal.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stock request lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Submitted,
    Approved,
    Rejected,
    PartiallyIssued,
    Closed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Submitted => "SUBMITTED",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::PartiallyIssued => "PARTIALLY_ISSUED",
            RequestStatus::Closed => "CLOSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUBMITTED" => Some(RequestStatus::Submitted),
            "APPROVED" => Some(RequestStatus::Approved),
            "REJECTED" => Some(RequestStatus::Rejected),
            "PARTIALLY_ISSUED" => Some(RequestStatus::PartiallyIssued),
            "CLOSED" => Some(RequestStatus::Closed),
            _ => None,
        }
    }

    /// Approval is valid from SUBMITTED or PARTIALLY_ISSUED
    pub fn can_approve(&self) -> bool {
        matches!(self, RequestStatus::Submitted | RequestStatus::PartiallyIssued)
    }

    /// Issuing is valid once the request carries approved quantity
    pub fn can_issue(&self) -> bool {
        matches!(self, RequestStatus::Approved | RequestStatus::PartiallyIssued)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Rejected | RequestStatus::Closed)
    }
}

/// An internal department's request for stock from a store
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockRequest {
    pub id: Uuid,
    pub store_id: Uuid,
    pub department_id: Uuid,
    pub request_no: String,
    pub requested_by: Uuid,
    pub date: NaiveDate,
    pub status: RequestStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line on a stock request
///
/// Invariant: `qty_issued <= qty_approved`, always.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RequestLine {
    pub id: Uuid,
    pub request_id: Uuid,
    pub item_id: Uuid,
    pub qty_requested: Decimal,
    pub qty_approved: Decimal,
    pub qty_issued: Decimal,
    pub created_at: DateTime<Utc>,
}

impl RequestLine {
    /// Approved quantity not yet issued
    pub fn remaining_approved(&self) -> Decimal {
        (self.qty_approved - self.qty_issued).max(Decimal::ZERO)
    }
}

/// Clamp an approval so the `qty_issued <= qty_approved` invariant holds.
///
/// The approved quantity is clamped to be non-negative; if it falls below
/// quantity already issued, the issued figure is clamped down to match.
/// Returns the `(qty_approved, qty_issued)` pair to store.
pub fn clamp_approval(qty_approved: Decimal, qty_issued: Decimal) -> (Decimal, Decimal) {
    let approved = qty_approved.max(Decimal::ZERO);
    let issued = qty_issued.min(approved);
    (approved, issued)
}

/// Derive the request status implied by its lines after an issue.
///
/// CLOSED when every line with approved quantity is fully issued and at
/// least one line has approved quantity; PARTIALLY_ISSUED when anything has
/// been issued; `None` (leave unchanged) otherwise.
pub fn derive_request_status(lines: &[RequestLine]) -> Option<RequestStatus> {
    let approved_lines = lines
        .iter()
        .filter(|l| l.qty_approved > Decimal::ZERO)
        .collect::<Vec<_>>();

    let fully_issued = !approved_lines.is_empty()
        && approved_lines.iter().all(|l| l.qty_issued >= l.qty_approved);
    if fully_issued {
        return Some(RequestStatus::Closed);
    }

    if lines.iter().any(|l| l.qty_issued > Decimal::ZERO) {
        return Some(RequestStatus::PartiallyIssued);
    }

    None
}
