//! Catalog service for reference entities
//!
//! Stores, departments, suppliers, and items: simple keyed records read by
//! every workflow. Items and suppliers are deactivated rather than deleted
//! so historical documents keep resolving.

use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::numbering::DocumentNumbering;
use shared::{Department, Item, Store, Supplier};

/// Catalog service for reference data
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
    numbering: Arc<dyn DocumentNumbering>,
}

/// Input for creating a store
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreInput {
    pub name: String,
    pub location: Option<String>,
}

/// Input for creating a department
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentInput {
    pub store_id: Uuid,
    pub name: String,
}

/// Input for creating a supplier
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierInput {
    pub name: String,
    pub phone: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
}

/// Input for updating a supplier
///
/// Absent fields keep their current values; updates cannot clear a
/// field back to empty.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
}

/// Input for creating an item
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemInput {
    /// Caller-supplied code, or generated when absent
    pub code: Option<String>,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
}

/// Input for updating an item
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
}

impl CatalogService {
    pub fn new(db: PgPool, numbering: Arc<dyn DocumentNumbering>) -> Self {
        Self { db, numbering }
    }

    // ------------------------------------------------------------------
    // Stores
    // ------------------------------------------------------------------

    pub async fn list_stores(&self) -> AppResult<Vec<Store>> {
        let stores = sqlx::query_as::<_, Store>("SELECT * FROM stores ORDER BY name ASC")
            .fetch_all(&self.db)
            .await?;
        Ok(stores)
    }

    pub async fn get_store(&self, store_id: Uuid) -> AppResult<Store> {
        sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = $1")
            .bind(store_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Store".to_string()))
    }

    pub async fn create_store(&self, input: CreateStoreInput) -> AppResult<Store> {
        let code = self.numbering.next("STR");
        let store = sqlx::query_as::<_, Store>(
            r#"
            INSERT INTO stores (code, name, location)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&code)
        .bind(&input.name)
        .bind(input.location.unwrap_or_default())
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "name"))?;

        Ok(store)
    }

    // ------------------------------------------------------------------
    // Departments
    // ------------------------------------------------------------------

    pub async fn list_departments(&self, store_id: Option<Uuid>) -> AppResult<Vec<Department>> {
        let departments = sqlx::query_as::<_, Department>(
            r#"
            SELECT * FROM departments
            WHERE ($1::uuid IS NULL OR store_id = $1)
            ORDER BY name ASC
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.db)
        .await?;
        Ok(departments)
    }

    pub async fn get_department(&self, department_id: Uuid) -> AppResult<Department> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
            .bind(department_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Department".to_string()))
    }

    pub async fn create_department(&self, input: CreateDepartmentInput) -> AppResult<Department> {
        // The store must resolve before we hang a department off it
        self.get_store(input.store_id).await?;

        let code = self.numbering.next("DEPT");
        let department = sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO departments (code, store_id, name)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&code)
        .bind(input.store_id)
        .bind(&input.name)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "name"))?;

        Ok(department)
    }

    // ------------------------------------------------------------------
    // Suppliers
    // ------------------------------------------------------------------

    pub async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT * FROM suppliers WHERE is_active = TRUE ORDER BY name ASC",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(suppliers)
    }

    pub async fn get_supplier(&self, supplier_id: Uuid) -> AppResult<Supplier> {
        sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
            .bind(supplier_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    pub async fn create_supplier(&self, input: CreateSupplierInput) -> AppResult<Supplier> {
        let code = self.numbering.next("SUP");
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (code, name, phone, contact, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&code)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.contact)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "code"))?;

        Ok(supplier)
    }

    pub async fn update_supplier(
        &self,
        supplier_id: Uuid,
        input: UpdateSupplierInput,
    ) -> AppResult<Supplier> {
        let existing = self.get_supplier(supplier_id).await?;

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = $1, phone = $2, contact = $3, address = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.phone.or(existing.phone))
        .bind(input.contact.or(existing.contact))
        .bind(input.address.or(existing.address))
        .bind(supplier_id)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    pub async fn deactivate_supplier(&self, supplier_id: Uuid) -> AppResult<Supplier> {
        sqlx::query_as::<_, Supplier>(
            "UPDATE suppliers SET is_active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    pub async fn list_items(&self) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT * FROM items WHERE is_active = TRUE ORDER BY name ASC",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(items)
    }

    pub async fn get_item(&self, item_id: Uuid) -> AppResult<Item> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1")
            .bind(item_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".to_string()))
    }

    pub async fn create_item(&self, input: CreateItemInput) -> AppResult<Item> {
        let code = input.code.unwrap_or_else(|| self.numbering.next("ITM"));
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (code, name, category, unit)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&code)
        .bind(&input.name)
        .bind(input.category.unwrap_or_else(|| "General".to_string()))
        .bind(input.unit.unwrap_or_else(|| "pcs".to_string()))
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "code"))?;

        Ok(item)
    }

    pub async fn update_item(&self, item_id: Uuid, input: UpdateItemInput) -> AppResult<Item> {
        let existing = self.get_item(item_id).await?;

        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET name = $1, category = $2, unit = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.category.unwrap_or(existing.category))
        .bind(input.unit.unwrap_or(existing.unit))
        .bind(item_id)
        .fetch_one(&self.db)
        .await?;

        Ok(item)
    }

    pub async fn deactivate_item(&self, item_id: Uuid) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(
            "UPDATE items SET is_active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Item".to_string()))
    }
}

/// Translate a unique-index violation into a DuplicateEntry error
fn map_unique_violation(e: sqlx::Error, field: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::DuplicateEntry(field.to_string());
        }
    }
    e.into()
}
