//! Goods received note service
//!
//! GRNs move DRAFT -> POSTED. Drafts are freely editable; posting turns
//! each line into a stock lot in one transaction and freezes the document.
//! Posting an already-posted GRN is a no-op success so a retried request
//! can never double-create lots.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::exists;
use crate::services::numbering::DocumentNumbering;
use crate::services::stock::StockService;
use shared::{line_total, sub_total, validate_non_negative, Grn, GrnLine, GrnStatus};

/// Goods received note service
#[derive(Clone)]
pub struct GrnService {
    db: PgPool,
    numbering: Arc<dyn DocumentNumbering>,
}

/// One line of a GRN being created or edited
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrnLineInput {
    pub item_id: Uuid,
    pub qty_received: Decimal,
    pub unit_cost: Decimal,
}

/// Input for creating a draft GRN
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGrnInput {
    pub store_id: Uuid,
    pub supplier_id: Uuid,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub lines: Vec<GrnLineInput>,
}

/// Input for rewriting a draft GRN
///
/// Lines are replaced wholesale; absent header fields keep their
/// current values, so an existing note cannot be cleared, only
/// overwritten.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGrnInput {
    pub supplier_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub note: Option<String>,
    pub lines: Vec<GrnLineInput>,
}

/// Filters for listing GRNs
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrnFilter {
    pub store_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// GRN header with its lines
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrnWithLines {
    #[serde(flatten)]
    pub grn: Grn,
    pub lines: Vec<GrnLine>,
}

impl GrnService {
    pub fn new(db: PgPool, numbering: Arc<dyn DocumentNumbering>) -> Self {
        Self { db, numbering }
    }

    pub async fn list(&self, filter: GrnFilter) -> AppResult<Vec<Grn>> {
        let grns = sqlx::query_as::<_, Grn>(
            r#"
            SELECT * FROM grns
            WHERE ($1::uuid IS NULL OR store_id = $1)
              AND ($2::uuid IS NULL OR supplier_id = $2)
              AND ($3::date IS NULL OR date >= $3)
              AND ($4::date IS NULL OR date <= $4)
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(filter.store_id)
        .bind(filter.supplier_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.db)
        .await?;
        Ok(grns)
    }

    pub async fn get(&self, grn_id: Uuid) -> AppResult<GrnWithLines> {
        let grn = sqlx::query_as::<_, Grn>("SELECT * FROM grns WHERE id = $1")
            .bind(grn_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("GRN".to_string()))?;

        let lines = sqlx::query_as::<_, GrnLine>(
            "SELECT * FROM grn_lines WHERE grn_id = $1 ORDER BY created_at ASC",
        )
        .bind(grn_id)
        .fetch_all(&self.db)
        .await?;

        Ok(GrnWithLines { grn, lines })
    }

    /// Create a draft GRN with its lines and computed totals
    pub async fn create_draft(&self, input: CreateGrnInput) -> AppResult<GrnWithLines> {
        validate_lines(&input.lines)?;

        // Referenced store and supplier must exist before the draft is saved
        exists(&self.db, "stores", input.store_id, "Store").await?;
        exists(&self.db, "suppliers", input.supplier_id, "Supplier").await?;

        let totals = compute_totals(&input.lines);
        let grn_no = self.numbering.next("GRN");

        let mut tx = self.db.begin().await?;

        let grn = sqlx::query_as::<_, Grn>(
            r#"
            INSERT INTO grns (store_id, supplier_id, grn_no, date, status, note, sub_total, grand_total)
            VALUES ($1, $2, $3, $4, 'DRAFT', $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(input.store_id)
        .bind(input.supplier_id)
        .bind(&grn_no)
        .bind(input.date)
        .bind(&input.note)
        .bind(totals)
        .bind(totals)
        .fetch_one(&mut *tx)
        .await?;

        let lines = insert_lines(&mut tx, grn.id, &input.lines).await?;

        tx.commit().await?;

        Ok(GrnWithLines { grn, lines })
    }

    /// Rewrite a draft GRN: header fields plus a full line replacement
    pub async fn update_draft(&self, grn_id: Uuid, input: UpdateGrnInput) -> AppResult<GrnWithLines> {
        validate_lines(&input.lines)?;

        if let Some(supplier_id) = input.supplier_id {
            exists(&self.db, "suppliers", supplier_id, "Supplier").await?;
        }

        let mut tx = self.db.begin().await?;

        let existing = fetch_for_update(&mut tx, grn_id).await?;
        if !existing.status.is_editable() {
            return Err(AppError::InvalidState(format!(
                "A {} GRN cannot be edited",
                existing.status.as_str()
            )));
        }

        let totals = compute_totals(&input.lines);

        let grn = sqlx::query_as::<_, Grn>(
            r#"
            UPDATE grns
            SET supplier_id = $1, date = $2, note = $3,
                sub_total = $4, grand_total = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(input.supplier_id.unwrap_or(existing.supplier_id))
        .bind(input.date.unwrap_or(existing.date))
        .bind(input.note.or(existing.note))
        .bind(totals)
        .bind(totals)
        .bind(grn_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM grn_lines WHERE grn_id = $1")
            .bind(grn_id)
            .execute(&mut *tx)
            .await?;
        let lines = insert_lines(&mut tx, grn_id, &input.lines).await?;

        tx.commit().await?;

        Ok(GrnWithLines { grn, lines })
    }

    /// Delete a draft GRN and its lines
    pub async fn delete_draft(&self, grn_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let existing = fetch_for_update(&mut tx, grn_id).await?;
        if !existing.status.is_editable() {
            return Err(AppError::InvalidState(format!(
                "A {} GRN cannot be deleted",
                existing.status.as_str()
            )));
        }

        sqlx::query("DELETE FROM grn_lines WHERE grn_id = $1")
            .bind(grn_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM grns WHERE id = $1")
            .bind(grn_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Post a GRN: create one stock lot per line and freeze the document.
    ///
    /// The whole operation is one transaction. The header row is locked
    /// first, so a concurrent post of the same GRN waits and then sees
    /// POSTED, taking the idempotent early return instead of creating a
    /// second set of lots.
    pub async fn post(&self, grn_id: Uuid) -> AppResult<GrnWithLines> {
        let mut tx = self.db.begin().await?;

        let grn = fetch_for_update(&mut tx, grn_id).await?;
        if grn.status == GrnStatus::Posted {
            tx.commit().await?;
            return self.get(grn_id).await;
        }

        let lines = sqlx::query_as::<_, GrnLine>(
            "SELECT * FROM grn_lines WHERE grn_id = $1 ORDER BY created_at ASC",
        )
        .bind(grn_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(AppError::validation(
                "lines",
                "Cannot post a GRN without lines",
            ));
        }

        for line in &lines {
            StockService::create_lot(
                &mut tx,
                grn.store_id,
                line.item_id,
                grn.id,
                &grn.grn_no,
                line.qty_received,
                line.unit_cost,
                grn.date,
            )
            .await?;
        }

        let updated = sqlx::query_as::<_, Grn>(
            r#"
            UPDATE grns SET status = 'POSTED', updated_at = NOW()
            WHERE id = $1 AND status = 'DRAFT'
            RETURNING *
            "#,
        )
        .bind(grn_id)
        .fetch_optional(&mut *tx)
        .await?;

        // Zero rows means another writer posted first; dropping the
        // transaction discards our lot inserts and theirs stand
        let Some(grn) = updated else {
            drop(tx);
            return self.get(grn_id).await;
        };

        tx.commit().await?;

        Ok(GrnWithLines { grn, lines })
    }
}

/// Lock and return a GRN header inside the caller's transaction
async fn fetch_for_update(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    grn_id: Uuid,
) -> AppResult<Grn> {
    sqlx::query_as::<_, Grn>("SELECT * FROM grns WHERE id = $1 FOR UPDATE")
        .bind(grn_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("GRN".to_string()))
}

async fn insert_lines(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    grn_id: Uuid,
    inputs: &[GrnLineInput],
) -> AppResult<Vec<GrnLine>> {
    let mut lines = Vec::with_capacity(inputs.len());
    for input in inputs {
        let line = sqlx::query_as::<_, GrnLine>(
            r#"
            INSERT INTO grn_lines (grn_id, item_id, qty_received, unit_cost, line_total)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(grn_id)
        .bind(input.item_id)
        .bind(input.qty_received)
        .bind(input.unit_cost)
        .bind(line_total(input.qty_received, input.unit_cost))
        .fetch_one(&mut **tx)
        .await?;
        lines.push(line);
    }
    Ok(lines)
}

fn validate_lines(lines: &[GrnLineInput]) -> AppResult<()> {
    if lines.is_empty() {
        return Err(AppError::validation("lines", "At least one line is required"));
    }
    for line in lines {
        validate_non_negative(line.qty_received).map_err(|_| {
            AppError::validation("qtyReceived", "Quantity received cannot be negative")
        })?;
        validate_non_negative(line.unit_cost)
            .map_err(|_| AppError::validation("unitCost", "Unit cost cannot be negative"))?;
    }
    Ok(())
}

fn compute_totals(lines: &[GrnLineInput]) -> Decimal {
    sub_total(
        &lines
            .iter()
            .map(|l| (l.qty_received, l.unit_cost))
            .collect::<Vec<_>>(),
    )
}
