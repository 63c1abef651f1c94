//! HTTP handlers for stock request endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::request::{
    ApproveRequestInput, RequestFilter, RequestService, RequestWithLines, SubmitRequestInput,
};
use crate::AppState;
use shared::{Role, StockRequest};

/// List requests with optional filters
pub async fn list_requests(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(mut filter): Query<RequestFilter>,
) -> AppResult<Json<Vec<StockRequest>>> {
    filter.store_id = current_user.0.resolve_store_filter(filter.store_id)?;
    let service = RequestService::new(state.db, state.numbering);
    Ok(Json(service.list(filter).await?))
}

/// Get a request with its lines
pub async fn get_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<RequestWithLines>> {
    let service = RequestService::new(state.db, state.numbering);
    let request = service.get(request_id).await?;
    current_user.0.enforce_store_scope(request.request.store_id)?;
    Ok(Json(request))
}

/// Submit a new stock request
pub async fn submit_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SubmitRequestInput>,
) -> AppResult<Json<RequestWithLines>> {
    current_user
        .0
        .require_role(&[Role::Admin, Role::StoreKeeper, Role::DeptUser])?;
    current_user.0.enforce_store_scope(input.store_id)?;

    // Department users may only request for their own department
    if current_user.0.role == Role::DeptUser {
        if let Some(department_id) = current_user.0.department_id {
            if department_id != input.department_id {
                return Err(AppError::Forbidden(
                    "Department scope violation".to_string(),
                ));
            }
        }
    }

    let service = RequestService::new(state.db, state.numbering);
    Ok(Json(service.submit(current_user.0.user_id, input).await?))
}

/// Approve a request with per-line quantities
pub async fn approve_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
    Json(input): Json<ApproveRequestInput>,
) -> AppResult<Json<RequestWithLines>> {
    current_user
        .0
        .require_role(&[Role::Admin, Role::StoreKeeper])?;
    let service = RequestService::new(state.db, state.numbering);
    let existing = service.get(request_id).await?;
    current_user.0.enforce_store_scope(existing.request.store_id)?;
    Ok(Json(service.approve(request_id, input).await?))
}

/// Reject a request
pub async fn reject_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<RequestWithLines>> {
    current_user
        .0
        .require_role(&[Role::Admin, Role::StoreKeeper])?;
    let service = RequestService::new(state.db, state.numbering);
    let existing = service.get(request_id).await?;
    current_user.0.enforce_store_scope(existing.request.store_id)?;
    Ok(Json(service.reject(request_id).await?))
}
