//! Goods received note tests
//!
//! Tests for the receiving workflow including:
//! - Line and document total computation
//! - Draft editability rules
//! - Posting creates exactly one lot per line
//! - Re-posting is idempotent

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::{line_total, sub_total, GrnStatus, StockLot};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// In-memory stand-in for a GRN being posted
struct SimGrn {
    store_id: Uuid,
    grn_no: String,
    date: NaiveDate,
    status: GrnStatus,
    lines: Vec<(Uuid, Decimal, Decimal)>, // (item_id, qty, cost)
    lots: Vec<StockLot>,
}

impl SimGrn {
    fn draft(lines: Vec<(Decimal, Decimal)>) -> Self {
        Self {
            store_id: Uuid::new_v4(),
            grn_no: "GRN-SIM00001".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            status: GrnStatus::Draft,
            lines: lines
                .into_iter()
                .map(|(q, c)| (Uuid::new_v4(), q, c))
                .collect(),
            lots: Vec::new(),
        }
    }

    /// Mirrors the posting transaction: idempotent, one lot per line
    fn post(&mut self) {
        if self.status == GrnStatus::Posted {
            return;
        }
        for (item_id, qty, cost) in &self.lines {
            self.lots.push(StockLot {
                id: Uuid::new_v4(),
                store_id: self.store_id,
                item_id: *item_id,
                grn_id: Uuid::new_v4(),
                grn_no: self.grn_no.clone(),
                qty_in: *qty,
                qty_out: Decimal::ZERO,
                qty_balance: *qty,
                unit_cost: *cost,
                received_at: self.date,
                created_at: chrono::Utc::now(),
            });
        }
        self.status = GrnStatus::Posted;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Line total is quantity times unit cost
    #[test]
    fn test_line_total_calculation() {
        assert_eq!(line_total(dec("50"), dec("10")), dec("500"));
        assert_eq!(line_total(dec("2.5"), dec("4.2")), dec("10.50"));
        assert_eq!(line_total(Decimal::ZERO, dec("99")), Decimal::ZERO);
    }

    /// Document total is the sum of line totals
    #[test]
    fn test_sub_total_calculation() {
        let lines = vec![
            (dec("50"), dec("10")),
            (dec("3"), dec("7.5")),
            (dec("1"), dec("0.25")),
        ];

        // 500 + 22.5 + 0.25 = 522.75
        assert_eq!(sub_total(&lines), dec("522.75"));
    }

    /// Only drafts are editable
    #[test]
    fn test_draft_editability() {
        assert!(GrnStatus::Draft.is_editable());
        assert!(!GrnStatus::Posted.is_editable());
    }

    /// Posting creates exactly one lot per line
    #[test]
    fn test_post_creates_one_lot_per_line() {
        let mut grn = SimGrn::draft(vec![
            (dec("50"), dec("10")),
            (dec("20"), dec("3")),
            (dec("7"), dec("1.5")),
        ]);

        grn.post();

        assert_eq!(grn.status, GrnStatus::Posted);
        assert_eq!(grn.lots.len(), 3);
        for (lot, (_, qty, cost)) in grn.lots.iter().zip(&grn.lines) {
            assert_eq!(lot.qty_in, *qty);
            assert_eq!(lot.qty_balance, *qty);
            assert_eq!(lot.qty_out, Decimal::ZERO);
            assert_eq!(lot.unit_cost, *cost);
            assert_eq!(lot.received_at, grn.date);
            assert_eq!(lot.grn_no, grn.grn_no);
        }
    }

    /// Re-posting a posted GRN creates no further lots
    #[test]
    fn test_repost_is_idempotent() {
        let mut grn = SimGrn::draft(vec![(dec("50"), dec("10"))]);

        grn.post();
        assert_eq!(grn.lots.len(), 1);

        grn.post();
        grn.post();
        assert_eq!(grn.lots.len(), 1);
        assert_eq!(grn.status, GrnStatus::Posted);
    }

    /// A zero-quantity line still yields a lot with zero balance
    #[test]
    fn test_zero_quantity_line_posts_empty_lot() {
        let mut grn = SimGrn::draft(vec![(Decimal::ZERO, dec("10"))]);
        grn.post();

        assert_eq!(grn.lots.len(), 1);
        assert_eq!(grn.lots[0].qty_balance, Decimal::ZERO);
        assert!(grn.lots[0].invariant_holds());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating received quantities (0.1 to 1000.0)
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1))
    }

    /// Strategy for generating unit costs (0.01 to 1000.00)
    fn cost_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100000i64).prop_map(|n| Decimal::new(n, 2))
    }

    /// Strategy for generating GRN lines
    fn lines_strategy() -> impl Strategy<Value = Vec<(Decimal, Decimal)>> {
        prop::collection::vec((quantity_strategy(), cost_strategy()), 1..10)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Document total always equals the sum of qty x cost per line
        #[test]
        fn prop_sub_total_matches_line_sums(lines in lines_strategy()) {
            let expected: Decimal = lines.iter().map(|(q, c)| q * c).sum();
            prop_assert_eq!(sub_total(&lines), expected);
        }

        /// Posting preserves quantities: total lot balance equals the
        /// total quantity on the document
        #[test]
        fn prop_post_conserves_quantity(lines in lines_strategy()) {
            let total_received: Decimal = lines.iter().map(|(q, _)| *q).sum();
            let mut grn = SimGrn::draft(lines);

            grn.post();

            let total_in_lots: Decimal = grn.lots.iter().map(|l| l.qty_balance).sum();
            prop_assert_eq!(total_in_lots, total_received);
            prop_assert!(grn.lots.iter().all(|l| l.invariant_holds()));
        }

        /// Posting any number of times yields the same lot set as
        /// posting once
        #[test]
        fn prop_post_idempotent(lines in lines_strategy(), extra_posts in 1usize..5) {
            let expected = lines.len();
            let mut grn = SimGrn::draft(lines);

            for _ in 0..=extra_posts {
                grn.post();
            }

            prop_assert_eq!(grn.lots.len(), expected);
        }
    }
}
