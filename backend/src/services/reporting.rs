//! Reporting service
//!
//! Read-only aggregations over issue history. The department consumption
//! report groups issued quantity and value by item and source GRN, so the
//! same item appears once per receipt batch it was drawn from.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Filters for the department consumption report
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionFilter {
    pub store_id: Uuid,
    pub department_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// One row of the department consumption report
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionRow {
    pub item_id: Uuid,
    pub item_code: String,
    pub item_name: String,
    pub grn_no: String,
    pub qty_issued: Decimal,
    pub total_value: Decimal,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Issued quantity and value per (item, source GRN) for a store,
    /// optionally narrowed to one department and a date range
    pub async fn department_consumption(
        &self,
        filter: ConsumptionFilter,
    ) -> AppResult<Vec<ConsumptionRow>> {
        let rows = sqlx::query_as::<_, ConsumptionRow>(
            r#"
            SELECT il.item_id,
                   i.code AS item_code,
                   i.name AS item_name,
                   il.grn_no,
                   SUM(il.qty) AS qty_issued,
                   SUM(il.line_total) AS total_value
            FROM issue_lines il
            JOIN issues iss ON iss.id = il.issue_id
            JOIN items i ON i.id = il.item_id
            WHERE iss.store_id = $1
              AND ($2::uuid IS NULL OR iss.department_id = $2)
              AND ($3::date IS NULL OR iss.date >= $3)
              AND ($4::date IS NULL OR iss.date <= $4)
            GROUP BY il.item_id, i.code, i.name, il.grn_no
            ORDER BY i.name ASC, il.grn_no ASC
            "#,
        )
        .bind(filter.store_id)
        .bind(filter.department_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    /// Render consumption rows as CSV with a header row
    pub fn to_csv(rows: &[ConsumptionRow]) -> AppResult<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        writer
            .write_record([
                "itemCode",
                "itemName",
                "grnNo",
                "qtyIssued",
                "totalValue",
            ])
            .map_err(|e| AppError::Internal(e.into()))?;

        for row in rows {
            writer
                .write_record([
                    row.item_code.as_str(),
                    row.item_name.as_str(),
                    row.grn_no.as_str(),
                    &row.qty_issued.to_string(),
                    &row.total_value.to_string(),
                ])
                .map_err(|e| AppError::Internal(e.into()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_export_includes_header_and_rows() {
        let rows = vec![ConsumptionRow {
            item_id: Uuid::new_v4(),
            item_code: "ITM-0001".to_string(),
            item_name: "Bath Towel".to_string(),
            grn_no: "GRN-AB12CD34".to_string(),
            qty_issued: Decimal::from(30),
            total_value: Decimal::from(300),
        }];

        let csv = ReportingService::to_csv(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("itemCode,itemName,grnNo,qtyIssued,totalValue")
        );
        assert_eq!(
            lines.next(),
            Some("ITM-0001,Bath Towel,GRN-AB12CD34,30,300")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_export_of_no_rows_is_header_only() {
        let csv = ReportingService::to_csv(&[]).unwrap();
        assert_eq!(csv.trim_end(), "itemCode,itemName,grnNo,qtyIssued,totalValue");
    }
}
