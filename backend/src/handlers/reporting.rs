//! HTTP handlers for reporting endpoints

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::reporting::{ConsumptionFilter, ConsumptionRow, ReportingService};
use crate::AppState;
use shared::Role;

/// Department consumption report as JSON
pub async fn department_consumption(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ConsumptionFilter>,
) -> AppResult<Json<Vec<ConsumptionRow>>> {
    current_user
        .0
        .require_role(&[Role::Admin, Role::StoreKeeper, Role::AccountsView])?;
    current_user.0.enforce_store_scope(filter.store_id)?;
    let service = ReportingService::new(state.db);
    Ok(Json(service.department_consumption(filter).await?))
}

/// Department consumption report as a CSV download
pub async fn department_consumption_csv(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ConsumptionFilter>,
) -> AppResult<Response> {
    current_user
        .0
        .require_role(&[Role::Admin, Role::StoreKeeper, Role::AccountsView])?;
    current_user.0.enforce_store_scope(filter.store_id)?;
    let service = ReportingService::new(state.db);
    let rows = service.department_consumption(filter).await?;
    let csv = ReportingService::to_csv(&rows)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"department-consumption.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}
