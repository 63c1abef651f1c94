//! Stock request service
//!
//! Departments submit requests against a store; a store keeper approves
//! (with per-line clamping), rejects, or issues against them. Status moves
//! SUBMITTED -> APPROVED | REJECTED; issuing drives the request on to
//! PARTIALLY_ISSUED and CLOSED in the issue service.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::exists;
use crate::services::numbering::DocumentNumbering;
use shared::{clamp_approval, validate_positive, RequestLine, RequestStatus, StockRequest};

/// Stock request service
#[derive(Clone)]
pub struct RequestService {
    db: PgPool,
    numbering: Arc<dyn DocumentNumbering>,
}

/// One line of a request being submitted
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLineInput {
    pub item_id: Uuid,
    pub qty_requested: Decimal,
}

/// Input for submitting a stock request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequestInput {
    pub store_id: Uuid,
    pub department_id: Uuid,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub lines: Vec<RequestLineInput>,
}

/// One line of an approval decision
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveLineInput {
    pub request_line_id: Uuid,
    pub qty_approved: Decimal,
}

/// Input for approving a request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequestInput {
    pub lines: Vec<ApproveLineInput>,
}

/// Filters for listing requests
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFilter {
    pub store_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    /// Status label as supplied in the query string, e.g. "SUBMITTED"
    pub status: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Request header with its lines
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWithLines {
    #[serde(flatten)]
    pub request: StockRequest,
    pub lines: Vec<RequestLine>,
}

impl RequestService {
    pub fn new(db: PgPool, numbering: Arc<dyn DocumentNumbering>) -> Self {
        Self { db, numbering }
    }

    pub async fn list(&self, filter: RequestFilter) -> AppResult<Vec<StockRequest>> {
        let status = filter
            .status
            .as_deref()
            .map(|s| {
                RequestStatus::parse(s)
                    .ok_or_else(|| AppError::validation("status", "Unknown request status"))
            })
            .transpose()?;

        let requests = sqlx::query_as::<_, StockRequest>(
            r#"
            SELECT * FROM stock_requests
            WHERE ($1::uuid IS NULL OR store_id = $1)
              AND ($2::uuid IS NULL OR department_id = $2)
              AND ($3::varchar IS NULL OR status = $3)
              AND ($4::date IS NULL OR date >= $4)
              AND ($5::date IS NULL OR date <= $5)
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(filter.store_id)
        .bind(filter.department_id)
        .bind(status.map(|s| s.as_str()))
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.db)
        .await?;
        Ok(requests)
    }

    pub async fn get(&self, request_id: Uuid) -> AppResult<RequestWithLines> {
        let request =
            sqlx::query_as::<_, StockRequest>("SELECT * FROM stock_requests WHERE id = $1")
                .bind(request_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Stock request".to_string()))?;

        let lines = self.lines_of(request_id).await?;

        Ok(RequestWithLines { request, lines })
    }

    /// Submit a new request in SUBMITTED status
    pub async fn submit(
        &self,
        requested_by: Uuid,
        input: SubmitRequestInput,
    ) -> AppResult<RequestWithLines> {
        if input.lines.is_empty() {
            return Err(AppError::validation("lines", "At least one line is required"));
        }
        for line in &input.lines {
            validate_positive(line.qty_requested).map_err(|_| {
                AppError::validation("qtyRequested", "Requested quantity must be positive")
            })?;
        }

        exists(&self.db, "stores", input.store_id, "Store").await?;
        let department: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM departments WHERE id = $1 AND store_id = $2",
        )
        .bind(input.department_id)
        .bind(input.store_id)
        .fetch_optional(&self.db)
        .await?;
        if department.is_none() {
            return Err(AppError::validation(
                "departmentId",
                "Department does not belong to the requested store",
            ));
        }

        let request_no = self.numbering.next("REQ");
        let mut tx = self.db.begin().await?;

        let request = sqlx::query_as::<_, StockRequest>(
            r#"
            INSERT INTO stock_requests
                (store_id, department_id, request_no, requested_by, date, status, note)
            VALUES ($1, $2, $3, $4, $5, 'SUBMITTED', $6)
            RETURNING *
            "#,
        )
        .bind(input.store_id)
        .bind(input.department_id)
        .bind(&request_no)
        .bind(requested_by)
        .bind(input.date)
        .bind(&input.note)
        .fetch_one(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let inserted = sqlx::query_as::<_, RequestLine>(
                r#"
                INSERT INTO request_lines (request_id, item_id, qty_requested, qty_approved, qty_issued)
                VALUES ($1, $2, $3, 0, 0)
                RETURNING *
                "#,
            )
            .bind(request.id)
            .bind(line.item_id)
            .bind(line.qty_requested)
            .fetch_one(&mut *tx)
            .await?;
            lines.push(inserted);
        }

        tx.commit().await?;

        Ok(RequestWithLines { request, lines })
    }

    /// Approve a request, setting per-line approved quantities.
    ///
    /// Decision lines that do not belong to the request are skipped, not
    /// errors. Each approval is clamped so `qty_issued <= qty_approved`
    /// keeps holding even when an approval is lowered on a re-approval of
    /// a PARTIALLY_ISSUED request.
    pub async fn approve(
        &self,
        request_id: Uuid,
        input: ApproveRequestInput,
    ) -> AppResult<RequestWithLines> {
        let mut tx = self.db.begin().await?;

        let request = fetch_for_update(&mut tx, request_id).await?;
        if !request.status.can_approve() {
            return Err(AppError::InvalidState(format!(
                "Cannot approve a request in {} status",
                request.status.as_str()
            )));
        }

        for decision in &input.lines {
            let line = sqlx::query_as::<_, RequestLine>(
                "SELECT * FROM request_lines WHERE id = $1 AND request_id = $2",
            )
            .bind(decision.request_line_id)
            .bind(request_id)
            .fetch_optional(&mut *tx)
            .await?;
            let Some(line) = line else { continue };

            let (qty_approved, qty_issued) = clamp_approval(decision.qty_approved, line.qty_issued);
            sqlx::query(
                "UPDATE request_lines SET qty_approved = $1, qty_issued = $2 WHERE id = $3",
            )
            .bind(qty_approved)
            .bind(qty_issued)
            .bind(line.id)
            .execute(&mut *tx)
            .await?;
        }

        let request = sqlx::query_as::<_, StockRequest>(
            "UPDATE stock_requests SET status = 'APPROVED', updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let lines = self.lines_of(request_id).await?;
        Ok(RequestWithLines { request, lines })
    }

    /// Reject a request. Refused on terminal states so a CLOSED request
    /// cannot be flipped to REJECTED after the fact.
    pub async fn reject(&self, request_id: Uuid) -> AppResult<RequestWithLines> {
        let mut tx = self.db.begin().await?;

        let request = fetch_for_update(&mut tx, request_id).await?;
        if request.status.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "Cannot reject a request in {} status",
                request.status.as_str()
            )));
        }

        let request = sqlx::query_as::<_, StockRequest>(
            "UPDATE stock_requests SET status = 'REJECTED', updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let lines = self.lines_of(request_id).await?;
        Ok(RequestWithLines { request, lines })
    }

    async fn lines_of(&self, request_id: Uuid) -> AppResult<Vec<RequestLine>> {
        let lines = sqlx::query_as::<_, RequestLine>(
            "SELECT * FROM request_lines WHERE request_id = $1 ORDER BY created_at ASC",
        )
        .bind(request_id)
        .fetch_all(&self.db)
        .await?;
        Ok(lines)
    }
}

/// Lock and return a request header inside the caller's transaction
pub(crate) async fn fetch_for_update(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    request_id: Uuid,
) -> AppResult<StockRequest> {
    sqlx::query_as::<_, StockRequest>("SELECT * FROM stock_requests WHERE id = $1 FOR UPDATE")
        .bind(request_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock request".to_string()))
}
