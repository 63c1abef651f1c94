//! Issue service
//!
//! Issuing fulfills an approved request from named stock lots. The whole
//! operation runs in one transaction: every line consumes its lot and bumps
//! its request line, or nothing happens at all. Unit costs are frozen from
//! the consumed lot at issue time.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::numbering::DocumentNumbering;
use crate::services::request::fetch_for_update;
use crate::services::stock::StockService;
use shared::{derive_request_status, line_total, Issue, IssueLine, RequestLine};

/// Issue service
#[derive(Clone)]
pub struct IssueService {
    db: PgPool,
    numbering: Arc<dyn DocumentNumbering>,
}

/// One line of an issue: a named lot and a quantity against a request line
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLineInput {
    pub request_line_id: Uuid,
    pub stock_lot_id: Uuid,
    pub qty: Decimal,
}

/// Input for creating an issue against a request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueInput {
    pub request_id: Uuid,
    pub store_id: Uuid,
    pub department_id: Uuid,
    pub date: NaiveDate,
    pub lines: Vec<IssueLineInput>,
}

/// Filters for listing issues
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFilter {
    pub store_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub request_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Issue header with its lines
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueWithLines {
    #[serde(flatten)]
    pub issue: Issue,
    pub lines: Vec<IssueLine>,
}

impl IssueService {
    pub fn new(db: PgPool, numbering: Arc<dyn DocumentNumbering>) -> Self {
        Self { db, numbering }
    }

    pub async fn list(&self, filter: IssueFilter) -> AppResult<Vec<Issue>> {
        let issues = sqlx::query_as::<_, Issue>(
            r#"
            SELECT * FROM issues
            WHERE ($1::uuid IS NULL OR store_id = $1)
              AND ($2::uuid IS NULL OR department_id = $2)
              AND ($3::uuid IS NULL OR request_id = $3)
              AND ($4::date IS NULL OR date >= $4)
              AND ($5::date IS NULL OR date <= $5)
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(filter.store_id)
        .bind(filter.department_id)
        .bind(filter.request_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.db)
        .await?;
        Ok(issues)
    }

    pub async fn get(&self, issue_id: Uuid) -> AppResult<IssueWithLines> {
        let issue = sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE id = $1")
            .bind(issue_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Issue".to_string()))?;

        let lines = sqlx::query_as::<_, IssueLine>(
            "SELECT * FROM issue_lines WHERE issue_id = $1 ORDER BY created_at ASC",
        )
        .bind(issue_id)
        .fetch_all(&self.db)
        .await?;

        Ok(IssueWithLines { issue, lines })
    }

    /// Issue stock against an approved request from named lots.
    ///
    /// Per-line rules:
    /// - non-positive quantity: line skipped
    /// - request line missing or belonging to another request: line skipped
    /// - quantity over the line's remaining approval: whole issue aborts
    /// - lot missing: whole issue aborts (NotFound)
    /// - lot in another store, or for another item: whole issue aborts
    /// - lot balance short: whole issue aborts (InsufficientStock)
    ///
    /// The request header is locked first, so concurrent issues against the
    /// same request serialize. Lot decrements and request-line bumps are
    /// conditional updates, closing the race against concurrent issues of
    /// other requests drawing on the same lots.
    pub async fn create(&self, issued_by: Uuid, input: CreateIssueInput) -> AppResult<IssueWithLines> {
        let mut tx = self.db.begin().await?;

        let request = fetch_for_update(&mut tx, input.request_id).await?;
        if request.store_id != input.store_id {
            return Err(AppError::validation(
                "storeId",
                "Store does not match the request",
            ));
        }
        if request.department_id != input.department_id {
            return Err(AppError::validation(
                "departmentId",
                "Department does not match the request",
            ));
        }
        if !request.status.can_issue() {
            return Err(AppError::InvalidState(format!(
                "Cannot issue against a request in {} status",
                request.status.as_str()
            )));
        }

        let issue_no = self.numbering.next("ISS");
        let issue = sqlx::query_as::<_, Issue>(
            r#"
            INSERT INTO issues (store_id, department_id, request_id, issue_no, issued_by, date, grand_total)
            VALUES ($1, $2, $3, $4, $5, $6, 0)
            RETURNING *
            "#,
        )
        .bind(request.store_id)
        .bind(request.department_id)
        .bind(request.id)
        .bind(&issue_no)
        .bind(issued_by)
        .bind(input.date)
        .fetch_one(&mut *tx)
        .await?;

        let mut grand_total = Decimal::ZERO;
        let mut lines = Vec::new();

        for line in &input.lines {
            if line.qty <= Decimal::ZERO {
                continue;
            }

            let request_line = sqlx::query_as::<_, RequestLine>(
                "SELECT * FROM request_lines WHERE id = $1 AND request_id = $2",
            )
            .bind(line.request_line_id)
            .bind(request.id)
            .fetch_optional(&mut *tx)
            .await?;
            let Some(request_line) = request_line else {
                continue;
            };

            if line.qty > request_line.remaining_approved() {
                return Err(AppError::ExceedsApproved(format!(
                    "Quantity {} exceeds remaining approval {} on line {}",
                    line.qty,
                    request_line.remaining_approved(),
                    request_line.id
                )));
            }

            let lot = StockService::get_lot(&mut tx, line.stock_lot_id).await?;
            if lot.store_id != request.store_id {
                return Err(AppError::validation(
                    "stockLotId",
                    "Stock lot belongs to a different store",
                ));
            }
            if lot.item_id != request_line.item_id {
                return Err(AppError::validation(
                    "stockLotId",
                    "Stock lot holds a different item than the request line",
                ));
            }

            StockService::consume(&mut tx, &lot, line.qty).await?;

            let total = line_total(line.qty, lot.unit_cost);
            let inserted = sqlx::query_as::<_, IssueLine>(
                r#"
                INSERT INTO issue_lines
                    (issue_id, request_line_id, item_id, stock_lot_id, grn_no, qty, unit_cost, line_total)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
                "#,
            )
            .bind(issue.id)
            .bind(request_line.id)
            .bind(request_line.item_id)
            .bind(lot.id)
            .bind(&lot.grn_no)
            .bind(line.qty)
            .bind(lot.unit_cost)
            .bind(total)
            .fetch_one(&mut *tx)
            .await?;

            // Conditional bump holds qty_issued <= qty_approved under
            // concurrent issues the header lock does not cover
            let bumped = sqlx::query(
                r#"
                UPDATE request_lines
                SET qty_issued = qty_issued + $1
                WHERE id = $2 AND qty_issued + $1 <= qty_approved
                "#,
            )
            .bind(line.qty)
            .bind(request_line.id)
            .execute(&mut *tx)
            .await?;
            if bumped.rows_affected() == 0 {
                return Err(AppError::ExceedsApproved(format!(
                    "Quantity {} exceeds remaining approval on line {}",
                    line.qty, request_line.id
                )));
            }

            grand_total += total;
            lines.push(inserted);
        }

        if lines.is_empty() {
            return Err(AppError::validation(
                "lines",
                "No issuable lines in the request",
            ));
        }

        let issue = sqlx::query_as::<_, Issue>(
            "UPDATE issues SET grand_total = $1 WHERE id = $2 RETURNING *",
        )
        .bind(grand_total)
        .bind(issue.id)
        .fetch_one(&mut *tx)
        .await?;

        let all_lines = sqlx::query_as::<_, RequestLine>(
            "SELECT * FROM request_lines WHERE request_id = $1",
        )
        .bind(request.id)
        .fetch_all(&mut *tx)
        .await?;

        if let Some(status) = derive_request_status(&all_lines) {
            sqlx::query(
                "UPDATE stock_requests SET status = $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(status.as_str())
            .bind(request.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(IssueWithLines { issue, lines })
    }
}
