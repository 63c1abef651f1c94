//! Request and issue workflow tests
//!
//! Tests for the request lifecycle and issuing including:
//! - Approval clamping keeps qty_issued <= qty_approved
//! - Status derivation after an issue
//! - Issue atomicity: a failing line rolls back the whole issue
//! - Worked end-to-end scenario over one stock lot

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::{
    clamp_approval, derive_request_status, line_total, RequestLine, RequestStatus, StockLot,
};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn request_line(qty_requested: Decimal, qty_approved: Decimal) -> RequestLine {
    RequestLine {
        id: Uuid::new_v4(),
        request_id: Uuid::new_v4(),
        item_id: Uuid::new_v4(),
        qty_requested,
        qty_approved,
        qty_issued: Decimal::ZERO,
        created_at: chrono::Utc::now(),
    }
}

fn lot(item_id: Uuid, qty_in: Decimal, unit_cost: Decimal) -> StockLot {
    StockLot {
        id: Uuid::new_v4(),
        store_id: Uuid::new_v4(),
        item_id,
        grn_id: Uuid::new_v4(),
        grn_no: "GRN-SIM00001".to_string(),
        qty_in,
        qty_out: Decimal::ZERO,
        qty_balance: qty_in,
        unit_cost,
        received_at: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        created_at: chrono::Utc::now(),
    }
}

/// In-memory stand-in for the issue transaction: either every line lands
/// or nothing changes
struct SimLedger {
    lots: Vec<StockLot>,
    lines: Vec<RequestLine>,
    status: RequestStatus,
}

impl SimLedger {
    fn new(lots: Vec<StockLot>, lines: Vec<RequestLine>) -> Self {
        Self {
            lots,
            lines,
            status: RequestStatus::Approved,
        }
    }

    /// Issue against (line index, lot index, qty) triples. Mirrors the
    /// service's per-line rules: skip non-positive quantities, abort on
    /// over-approval or short lot balance. Returns the issue total.
    fn issue(&mut self, draws: &[(usize, usize, Decimal)]) -> Result<Decimal, &'static str> {
        if !self.status.can_issue() {
            return Err("invalid state");
        }

        let mut lots = self.lots.clone();
        let mut lines = self.lines.clone();
        let mut total = Decimal::ZERO;
        let mut issued_any = false;

        for (line_idx, lot_idx, qty) in draws {
            if *qty <= Decimal::ZERO {
                continue;
            }
            let line = &mut lines[*line_idx];
            if *qty > line.remaining_approved() {
                return Err("exceeds approved");
            }
            let lot = &mut lots[*lot_idx];
            if lot.item_id != line.item_id {
                return Err("item mismatch");
            }
            lot.try_consume(*qty)?;
            line.qty_issued += *qty;
            total += line_total(*qty, lot.unit_cost);
            issued_any = true;
        }

        if !issued_any {
            return Err("nothing to issue");
        }

        // Commit
        self.lots = lots;
        self.lines = lines;
        if let Some(status) = derive_request_status(&self.lines) {
            self.status = status;
        }
        Ok(total)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Approval is clamped to non-negative
    #[test]
    fn test_negative_approval_clamps_to_zero() {
        let (approved, issued) = clamp_approval(dec("-5"), Decimal::ZERO);
        assert_eq!(approved, Decimal::ZERO);
        assert_eq!(issued, Decimal::ZERO);
    }

    /// Lowering an approval below the issued quantity pulls issued down
    #[test]
    fn test_lowered_approval_pulls_issued_down() {
        let (approved, issued) = clamp_approval(dec("3"), dec("7"));
        assert_eq!(approved, dec("3"));
        assert_eq!(issued, dec("3"));
        assert!(issued <= approved);
    }

    /// Remaining approval is approved minus issued, floored at zero
    #[test]
    fn test_remaining_approved() {
        let mut line = request_line(dec("10"), dec("8"));
        assert_eq!(line.remaining_approved(), dec("8"));

        line.qty_issued = dec("5");
        assert_eq!(line.remaining_approved(), dec("3"));

        line.qty_issued = dec("8");
        assert_eq!(line.remaining_approved(), Decimal::ZERO);
    }

    /// Issuing part of the approval moves the request to PARTIALLY_ISSUED
    #[test]
    fn test_partial_issue_sets_partially_issued() {
        let item = Uuid::new_v4();
        let mut line = request_line(dec("10"), dec("10"));
        line.item_id = item;
        let mut ledger = SimLedger::new(vec![lot(item, dec("50"), dec("10"))], vec![line]);

        ledger.issue(&[(0, 0, dec("4"))]).unwrap();

        assert_eq!(ledger.status, RequestStatus::PartiallyIssued);
        assert_eq!(ledger.lines[0].qty_issued, dec("4"));
    }

    /// Issuing the full approval closes the request
    #[test]
    fn test_full_issue_closes_request() {
        let item = Uuid::new_v4();
        let mut line = request_line(dec("10"), dec("10"));
        line.item_id = item;
        let mut ledger = SimLedger::new(vec![lot(item, dec("50"), dec("10"))], vec![line]);

        ledger.issue(&[(0, 0, dec("10"))]).unwrap();

        assert_eq!(ledger.status, RequestStatus::Closed);
    }

    /// A failing line aborts the whole issue: lots and request lines are
    /// exactly as before
    #[test]
    fn test_failing_line_rolls_back_whole_issue() {
        let item = Uuid::new_v4();
        let mut line_a = request_line(dec("10"), dec("10"));
        line_a.item_id = item;
        let mut line_b = request_line(dec("10"), dec("2"));
        line_b.item_id = item;

        let mut ledger = SimLedger::new(
            vec![lot(item, dec("50"), dec("10"))],
            vec![line_a, line_b],
        );

        // Second draw exceeds line B's approval, so the first draw must
        // not stick either
        let result = ledger.issue(&[(0, 0, dec("5")), (1, 0, dec("3"))]);

        assert!(result.is_err());
        assert_eq!(ledger.lots[0].qty_balance, dec("50"));
        assert_eq!(ledger.lines[0].qty_issued, Decimal::ZERO);
        assert_eq!(ledger.lines[1].qty_issued, Decimal::ZERO);
        assert_eq!(ledger.status, RequestStatus::Approved);
    }

    /// A short lot balance likewise aborts the whole issue
    #[test]
    fn test_short_lot_rolls_back_whole_issue() {
        let item = Uuid::new_v4();
        let mut line = request_line(dec("40"), dec("40"));
        line.item_id = item;
        let mut ledger = SimLedger::new(vec![lot(item, dec("20"), dec("10"))], vec![line]);

        let result = ledger.issue(&[(0, 0, dec("25"))]);

        assert!(result.is_err());
        assert_eq!(ledger.lots[0].qty_balance, dec("20"));
        assert_eq!(ledger.lines[0].qty_issued, Decimal::ZERO);
    }

    /// Non-positive draw quantities are skipped, not errors
    #[test]
    fn test_non_positive_draws_are_skipped() {
        let item = Uuid::new_v4();
        let mut line = request_line(dec("10"), dec("10"));
        line.item_id = item;
        let mut ledger = SimLedger::new(vec![lot(item, dec("50"), dec("10"))], vec![line]);

        let total = ledger
            .issue(&[(0, 0, Decimal::ZERO), (0, 0, dec("-2")), (0, 0, dec("6"))])
            .unwrap();

        assert_eq!(total, dec("60"));
        assert_eq!(ledger.lines[0].qty_issued, dec("6"));
    }

    /// Terminal statuses refuse further issuing
    #[test]
    fn test_terminal_request_refuses_issue() {
        let item = Uuid::new_v4();
        let mut line = request_line(dec("10"), dec("10"));
        line.item_id = item;
        let mut ledger = SimLedger::new(vec![lot(item, dec("50"), dec("10"))], vec![line]);
        ledger.status = RequestStatus::Rejected;

        assert!(ledger.issue(&[(0, 0, dec("1"))]).is_err());
    }

    /// Worked scenario: receive 50 @ 10, issue 30, then a second request
    /// for 25 cannot be fulfilled from the remaining 20
    #[test]
    fn test_worked_scenario() {
        let item = Uuid::new_v4();
        let mut line = request_line(dec("30"), dec("30"));
        line.item_id = item;
        let mut ledger = SimLedger::new(vec![lot(item, dec("50"), dec("10"))], vec![line]);

        let total = ledger.issue(&[(0, 0, dec("30"))]).unwrap();
        assert_eq!(total, dec("300"));
        assert_eq!(ledger.lots[0].qty_balance, dec("20"));
        assert_eq!(ledger.status, RequestStatus::Closed);

        // Second request against the same lot
        let mut second = request_line(dec("25"), dec("25"));
        second.item_id = item;
        let mut ledger2 = SimLedger::new(ledger.lots.clone(), vec![second]);

        assert!(ledger2.issue(&[(0, 0, dec("25"))]).is_err());
        assert_eq!(ledger2.lots[0].qty_balance, dec("20"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating quantities (0.1 to 1000.0)
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Clamping always yields qty_issued <= qty_approved and a
        /// non-negative approval
        #[test]
        fn prop_clamp_upholds_invariant(
            approved in -1000i64..1000i64,
            issued in 0i64..1000i64
        ) {
            let (a, i) = clamp_approval(Decimal::from(approved), Decimal::from(issued));
            prop_assert!(a >= Decimal::ZERO);
            prop_assert!(i <= a);
        }

        /// After any successful issue, every line still satisfies
        /// qty_issued <= qty_approved and lot balances stay non-negative
        #[test]
        fn prop_issue_preserves_invariants(
            qty_in in quantity_strategy(),
            approved in quantity_strategy(),
            draw in quantity_strategy()
        ) {
            let item = Uuid::new_v4();
            let mut line = request_line(approved, approved);
            line.item_id = item;
            let mut ledger = SimLedger::new(vec![lot(item, qty_in, dec("7"))], vec![line]);

            let _ = ledger.issue(&[(0, 0, draw)]);

            prop_assert!(ledger.lines[0].qty_issued <= ledger.lines[0].qty_approved);
            prop_assert!(ledger.lots[0].qty_balance >= Decimal::ZERO);
            prop_assert!(ledger.lots[0].invariant_holds());
        }

        /// Issue value equals draw quantity times the lot's frozen cost
        #[test]
        fn prop_issue_value_uses_lot_cost(
            draw in quantity_strategy(),
            cost in (1i64..=100000i64).prop_map(|n| Decimal::new(n, 2))
        ) {
            let item = Uuid::new_v4();
            let mut line = request_line(draw, draw);
            line.item_id = item;
            let mut ledger = SimLedger::new(vec![lot(item, draw, cost)], vec![line]);

            let total = ledger.issue(&[(0, 0, draw)]).unwrap();
            prop_assert_eq!(total, draw * cost);
        }

        /// A failed issue is a complete no-op on lots and lines
        #[test]
        fn prop_failed_issue_changes_nothing(
            qty_in in quantity_strategy(),
            excess in quantity_strategy()
        ) {
            let item = Uuid::new_v4();
            let over = qty_in + excess;
            let mut line = request_line(over, over);
            line.item_id = item;
            let mut ledger = SimLedger::new(vec![lot(item, qty_in, dec("3"))], vec![line]);

            prop_assert!(ledger.issue(&[(0, 0, over)]).is_err());
            prop_assert_eq!(ledger.lots[0].qty_balance, qty_in);
            prop_assert_eq!(ledger.lines[0].qty_issued, Decimal::ZERO);
            prop_assert_eq!(ledger.status, RequestStatus::Approved);
        }
    }
}
