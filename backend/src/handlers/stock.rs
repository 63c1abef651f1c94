//! HTTP handlers for stock ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::stock::{StockService, StockSummaryRow};
use crate::AppState;
use shared::StockLot;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableLotsQuery {
    pub item_id: Uuid,
}

/// List lots with remaining balance for a store+item, oldest first
pub async fn list_available_lots(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(store_id): Path<Uuid>,
    Query(query): Query<AvailableLotsQuery>,
) -> AppResult<Json<Vec<StockLot>>> {
    current_user.0.enforce_store_scope(store_id)?;
    let service = StockService::new(state.db);
    Ok(Json(
        service.list_available_lots(store_id, query.item_id).await?,
    ))
}

/// Per-item stock position across all lots of a store
pub async fn store_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockSummaryRow>>> {
    current_user.0.enforce_store_scope(store_id)?;
    let service = StockService::new(state.db);
    Ok(Json(service.store_summary(store_id).await?))
}
