//! Stock ledger service
//!
//! Maintains stock lots and answers "what is available to consume, in what
//! order" for a store+item pair. Lots are consumed oldest-first (FIFO):
//! `list_available_lots` returns them in received order so clients default
//! to the oldest, and `consume` is the single mutation point for lot
//! balances.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{validate_non_negative, validate_positive, StockLot};

/// Stock ledger service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Per-item stock position for a store
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockSummaryRow {
    pub item_id: Uuid,
    pub item_code: String,
    pub item_name: String,
    pub qty_balance: Decimal,
    pub stock_value: Decimal,
}

impl StockService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Lots with remaining balance for a store+item, oldest received first.
    ///
    /// The ordering is the FIFO policy: consumption should prefer the
    /// oldest received stock, matching physical rotation and giving
    /// deterministic costing. The server does not enforce the ordering on
    /// issue; clients are expected to default to the first lot returned
    /// here.
    pub async fn list_available_lots(
        &self,
        store_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<Vec<StockLot>> {
        let lots = sqlx::query_as::<_, StockLot>(
            r#"
            SELECT * FROM stock_lots
            WHERE store_id = $1 AND item_id = $2 AND qty_balance > 0
            ORDER BY received_at ASC, created_at ASC
            "#,
        )
        .bind(store_id)
        .bind(item_id)
        .fetch_all(&self.db)
        .await?;
        Ok(lots)
    }

    /// Per-item balance and valuation across all lots of a store
    pub async fn store_summary(&self, store_id: Uuid) -> AppResult<Vec<StockSummaryRow>> {
        let rows = sqlx::query_as::<_, StockSummaryRow>(
            r#"
            SELECT sl.item_id,
                   i.code AS item_code,
                   i.name AS item_name,
                   COALESCE(SUM(sl.qty_balance), 0) AS qty_balance,
                   COALESCE(SUM(sl.qty_balance * sl.unit_cost), 0) AS stock_value
            FROM stock_lots sl
            JOIN items i ON i.id = sl.item_id
            WHERE sl.store_id = $1
            GROUP BY sl.item_id, i.code, i.name
            ORDER BY i.name ASC
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    /// Create a stock lot inside the caller's transaction.
    ///
    /// Called exactly once per GRN line at post time. Quantity and cost
    /// must be non-negative; the lot starts with `qty_out = 0` and
    /// `qty_balance = qty_in`.
    pub async fn create_lot(
        tx: &mut Transaction<'_, Postgres>,
        store_id: Uuid,
        item_id: Uuid,
        grn_id: Uuid,
        grn_no: &str,
        qty_in: Decimal,
        unit_cost: Decimal,
        received_at: NaiveDate,
    ) -> AppResult<StockLot> {
        validate_non_negative(qty_in)
            .map_err(|_| AppError::validation("qtyIn", "Quantity received cannot be negative"))?;
        validate_non_negative(unit_cost)
            .map_err(|_| AppError::validation("unitCost", "Unit cost cannot be negative"))?;

        let lot = sqlx::query_as::<_, StockLot>(
            r#"
            INSERT INTO stock_lots
                (store_id, item_id, grn_id, grn_no, qty_in, qty_out, qty_balance, unit_cost, received_at)
            VALUES ($1, $2, $3, $4, $5, 0, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(store_id)
        .bind(item_id)
        .bind(grn_id)
        .bind(grn_no)
        .bind(qty_in)
        .bind(unit_cost)
        .bind(received_at)
        .fetch_one(&mut **tx)
        .await?;

        Ok(lot)
    }

    /// Consume quantity from a lot inside the caller's transaction.
    ///
    /// The decrement is a conditional atomic update guarded by
    /// `qty_balance >= qty`, so two concurrent issues against the same lot
    /// can never jointly overdraw it. No other code path may decrement
    /// `qty_balance`.
    pub async fn consume(
        tx: &mut Transaction<'_, Postgres>,
        lot: &StockLot,
        qty: Decimal,
    ) -> AppResult<()> {
        validate_positive(qty)
            .map_err(|_| AppError::validation("qty", "Consume quantity must be positive"))?;

        let result = sqlx::query(
            r#"
            UPDATE stock_lots
            SET qty_out = qty_out + $1, qty_balance = qty_balance - $1
            WHERE id = $2 AND qty_balance >= $1
            "#,
        )
        .bind(qty)
        .bind(lot.id)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InsufficientStock(lot.grn_no.clone()));
        }

        Ok(())
    }

    /// Fetch a lot by id inside the caller's transaction
    pub async fn get_lot(
        tx: &mut Transaction<'_, Postgres>,
        lot_id: Uuid,
    ) -> AppResult<StockLot> {
        sqlx::query_as::<_, StockLot>("SELECT * FROM stock_lots WHERE id = $1")
            .bind(lot_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Stock lot".to_string()))
    }
}
