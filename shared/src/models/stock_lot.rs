//! Stock lot model
//!
//! A lot is an immutable-cost batch of inventory created from exactly one
//! GRN line at post time. Only `qty_out`/`qty_balance` ever change, and
//! only through consumption by the issue workflow.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A batch of stock received into a store
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockLot {
    pub id: Uuid,
    pub store_id: Uuid,
    pub item_id: Uuid,
    pub grn_id: Uuid,
    /// GRN document number, denormalized for display and diagnostics
    pub grn_no: String,
    pub qty_in: Decimal,
    pub qty_out: Decimal,
    pub qty_balance: Decimal,
    /// Valuation basis for all consumption from this lot, fixed at creation
    pub unit_cost: Decimal,
    /// FIFO ordering key (the GRN date)
    pub received_at: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl StockLot {
    /// Whether the balance bookkeeping invariant holds
    pub fn invariant_holds(&self) -> bool {
        self.qty_balance == self.qty_in - self.qty_out && self.qty_balance >= Decimal::ZERO
    }

    /// Consume `qty` from this lot's balance.
    ///
    /// Mirrors the conditional update the ledger performs in SQL: the
    /// consumption succeeds only when `qty` is positive and does not exceed
    /// the remaining balance, and a failed consumption leaves the lot
    /// untouched.
    pub fn try_consume(&mut self, qty: Decimal) -> Result<(), &'static str> {
        if qty <= Decimal::ZERO {
            return Err("consume quantity must be positive");
        }
        if qty > self.qty_balance {
            return Err("consume quantity exceeds lot balance");
        }
        self.qty_out += qty;
        self.qty_balance -= qty;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lot(qty_in: i64) -> StockLot {
        StockLot {
            id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            grn_id: Uuid::new_v4(),
            grn_no: "GRN-TEST".to_string(),
            qty_in: Decimal::from(qty_in),
            qty_out: Decimal::ZERO,
            qty_balance: Decimal::from(qty_in),
            unit_cost: Decimal::from(10),
            received_at: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn consume_keeps_balance_arithmetic() {
        let mut l = lot(50);
        l.try_consume(Decimal::from(30)).unwrap();
        assert_eq!(l.qty_out, Decimal::from(30));
        assert_eq!(l.qty_balance, Decimal::from(20));
        assert!(l.invariant_holds());
    }

    #[test]
    fn consume_beyond_balance_fails_without_mutation() {
        let mut l = lot(20);
        let before = l.clone();
        assert!(l.try_consume(Decimal::from(25)).is_err());
        assert_eq!(l.qty_out, before.qty_out);
        assert_eq!(l.qty_balance, before.qty_balance);
    }

    #[test]
    fn consume_rejects_non_positive_quantity() {
        let mut l = lot(20);
        assert!(l.try_consume(Decimal::ZERO).is_err());
        assert!(l.try_consume(Decimal::from(-5)).is_err());
    }
}
