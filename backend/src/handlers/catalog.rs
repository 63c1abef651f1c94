//! HTTP handlers for catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::catalog::{
    CatalogService, CreateDepartmentInput, CreateItemInput, CreateStoreInput,
    CreateSupplierInput, UpdateItemInput, UpdateSupplierInput,
};
use crate::AppState;
use shared::{Department, Item, Role, Store, Supplier};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentQuery {
    pub store_id: Option<Uuid>,
}

// ----------------------------------------------------------------------
// Stores
// ----------------------------------------------------------------------

/// List all stores
pub async fn list_stores(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Store>>> {
    let service = CatalogService::new(state.db, state.numbering);
    Ok(Json(service.list_stores().await?))
}

/// Create a store
pub async fn create_store(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateStoreInput>,
) -> AppResult<Json<Store>> {
    current_user.0.require_role(&[Role::Admin])?;
    let service = CatalogService::new(state.db, state.numbering);
    Ok(Json(service.create_store(input).await?))
}

// ----------------------------------------------------------------------
// Departments
// ----------------------------------------------------------------------

/// List departments, optionally narrowed to one store
pub async fn list_departments(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<DepartmentQuery>,
) -> AppResult<Json<Vec<Department>>> {
    let service = CatalogService::new(state.db, state.numbering);
    Ok(Json(service.list_departments(query.store_id).await?))
}

/// Create a department under a store
pub async fn create_department(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateDepartmentInput>,
) -> AppResult<Json<Department>> {
    current_user.0.require_role(&[Role::Admin])?;
    current_user.0.enforce_store_scope(input.store_id)?;
    let service = CatalogService::new(state.db, state.numbering);
    Ok(Json(service.create_department(input).await?))
}

// ----------------------------------------------------------------------
// Suppliers
// ----------------------------------------------------------------------

/// List active suppliers
pub async fn list_suppliers(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Supplier>>> {
    let service = CatalogService::new(state.db, state.numbering);
    Ok(Json(service.list_suppliers().await?))
}

/// Create a supplier
pub async fn create_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateSupplierInput>,
) -> AppResult<Json<Supplier>> {
    current_user
        .0
        .require_role(&[Role::Admin, Role::StoreKeeper])?;
    let service = CatalogService::new(state.db, state.numbering);
    Ok(Json(service.create_supplier(input).await?))
}

/// Update a supplier
pub async fn update_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
    Json(input): Json<UpdateSupplierInput>,
) -> AppResult<Json<Supplier>> {
    current_user
        .0
        .require_role(&[Role::Admin, Role::StoreKeeper])?;
    let service = CatalogService::new(state.db, state.numbering);
    Ok(Json(service.update_supplier(supplier_id, input).await?))
}

/// Deactivate a supplier
pub async fn deactivate_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<Supplier>> {
    current_user.0.require_role(&[Role::Admin])?;
    let service = CatalogService::new(state.db, state.numbering);
    Ok(Json(service.deactivate_supplier(supplier_id).await?))
}

// ----------------------------------------------------------------------
// Items
// ----------------------------------------------------------------------

/// List active items
pub async fn list_items(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Item>>> {
    let service = CatalogService::new(state.db, state.numbering);
    Ok(Json(service.list_items().await?))
}

/// Create an item
pub async fn create_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateItemInput>,
) -> AppResult<Json<Item>> {
    current_user
        .0
        .require_role(&[Role::Admin, Role::StoreKeeper])?;
    let service = CatalogService::new(state.db, state.numbering);
    Ok(Json(service.create_item(input).await?))
}

/// Update an item
pub async fn update_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(input): Json<UpdateItemInput>,
) -> AppResult<Json<Item>> {
    current_user
        .0
        .require_role(&[Role::Admin, Role::StoreKeeper])?;
    let service = CatalogService::new(state.db, state.numbering);
    Ok(Json(service.update_item(item_id, input).await?))
}

/// Deactivate an item
pub async fn deactivate_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Item>> {
    current_user.0.require_role(&[Role::Admin])?;
    let service = CatalogService::new(state.db, state.numbering);
    Ok(Json(service.deactivate_item(item_id).await?))
}
