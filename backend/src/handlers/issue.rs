//! HTTP handlers for issue endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::issue::{CreateIssueInput, IssueFilter, IssueService, IssueWithLines};
use crate::AppState;
use shared::{Issue, Role};

/// List issues with optional filters
pub async fn list_issues(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(mut filter): Query<IssueFilter>,
) -> AppResult<Json<Vec<Issue>>> {
    filter.store_id = current_user.0.resolve_store_filter(filter.store_id)?;
    let service = IssueService::new(state.db, state.numbering);
    Ok(Json(service.list(filter).await?))
}

/// Get an issue with its lines
pub async fn get_issue(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(issue_id): Path<Uuid>,
) -> AppResult<Json<IssueWithLines>> {
    let service = IssueService::new(state.db, state.numbering);
    let issue = service.get(issue_id).await?;
    current_user.0.enforce_store_scope(issue.issue.store_id)?;
    Ok(Json(issue))
}

/// Issue stock against an approved request
pub async fn create_issue(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateIssueInput>,
) -> AppResult<Json<IssueWithLines>> {
    current_user
        .0
        .require_role(&[Role::Admin, Role::StoreKeeper])?;
    current_user.0.enforce_store_scope(input.store_id)?;

    let service = IssueService::new(state.db, state.numbering);
    Ok(Json(service.create(current_user.0.user_id, input).await?))
}
