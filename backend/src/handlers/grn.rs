//! HTTP handlers for goods received note endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::grn::{CreateGrnInput, GrnFilter, GrnService, GrnWithLines, UpdateGrnInput};
use crate::AppState;
use shared::{Grn, Role};

/// List GRNs with optional store/supplier/date filters
pub async fn list_grns(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(mut filter): Query<GrnFilter>,
) -> AppResult<Json<Vec<Grn>>> {
    filter.store_id = current_user.0.resolve_store_filter(filter.store_id)?;
    let service = GrnService::new(state.db, state.numbering);
    Ok(Json(service.list(filter).await?))
}

/// Get a GRN with its lines
pub async fn get_grn(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(grn_id): Path<Uuid>,
) -> AppResult<Json<GrnWithLines>> {
    let service = GrnService::new(state.db, state.numbering);
    let grn = service.get(grn_id).await?;
    current_user.0.enforce_store_scope(grn.grn.store_id)?;
    Ok(Json(grn))
}

/// Create a draft GRN
pub async fn create_grn(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateGrnInput>,
) -> AppResult<Json<GrnWithLines>> {
    current_user
        .0
        .require_role(&[Role::Admin, Role::StoreKeeper])?;
    current_user.0.enforce_store_scope(input.store_id)?;
    let service = GrnService::new(state.db, state.numbering);
    Ok(Json(service.create_draft(input).await?))
}

/// Rewrite a draft GRN
pub async fn update_grn(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(grn_id): Path<Uuid>,
    Json(input): Json<UpdateGrnInput>,
) -> AppResult<Json<GrnWithLines>> {
    current_user
        .0
        .require_role(&[Role::Admin, Role::StoreKeeper])?;
    let service = GrnService::new(state.db, state.numbering);
    let existing = service.get(grn_id).await?;
    current_user.0.enforce_store_scope(existing.grn.store_id)?;
    Ok(Json(service.update_draft(grn_id, input).await?))
}

/// Delete a draft GRN
pub async fn delete_grn(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(grn_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    current_user
        .0
        .require_role(&[Role::Admin, Role::StoreKeeper])?;
    let service = GrnService::new(state.db, state.numbering);
    let existing = service.get(grn_id).await?;
    current_user.0.enforce_store_scope(existing.grn.store_id)?;
    service.delete_draft(grn_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Post a GRN, creating its stock lots
pub async fn post_grn(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(grn_id): Path<Uuid>,
) -> AppResult<Json<GrnWithLines>> {
    current_user
        .0
        .require_role(&[Role::Admin, Role::StoreKeeper])?;
    let service = GrnService::new(state.db, state.numbering);
    let existing = service.get(grn_id).await?;
    current_user.0.enforce_store_scope(existing.grn.store_id)?;
    Ok(Json(service.post(grn_id).await?))
}
