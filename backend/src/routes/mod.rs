//! Route definitions for the Hotel Inventory Management API

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - catalog
        .nest("/stores", store_routes())
        .nest("/departments", department_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/items", item_routes())
        // Protected routes - receiving
        .nest("/grns", grn_routes())
        // Protected routes - stock ledger
        .nest("/stock", stock_routes())
        // Protected routes - request and issue workflow
        .nest("/requests", request_routes())
        .nest("/issues", issue_routes())
        // Protected routes - reporting
        .nest("/reports", report_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(handlers::auth::login))
}

/// Store routes (protected)
fn store_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::catalog::list_stores).post(handlers::catalog::create_store),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Department routes (protected)
fn department_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::catalog::list_departments).post(handlers::catalog::create_department),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Supplier routes (protected)
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::catalog::list_suppliers).post(handlers::catalog::create_supplier),
        )
        .route(
            "/:supplier_id",
            put(handlers::catalog::update_supplier).delete(handlers::catalog::deactivate_supplier),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Item routes (protected)
fn item_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::catalog::list_items).post(handlers::catalog::create_item),
        )
        .route(
            "/:item_id",
            put(handlers::catalog::update_item).delete(handlers::catalog::deactivate_item),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// GRN routes (protected)
fn grn_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::grn::list_grns).post(handlers::grn::create_grn),
        )
        .route(
            "/:grn_id",
            get(handlers::grn::get_grn)
                .put(handlers::grn::update_grn)
                .delete(handlers::grn::delete_grn),
        )
        .route("/:grn_id/post", post(handlers::grn::post_grn))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock ledger routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/:store_id/lots", get(handlers::stock::list_available_lots))
        .route("/:store_id/summary", get(handlers::stock::store_summary))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock request routes (protected)
fn request_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::request::list_requests).post(handlers::request::submit_request),
        )
        .route("/:request_id", get(handlers::request::get_request))
        .route("/:request_id/approve", post(handlers::request::approve_request))
        .route("/:request_id/reject", post(handlers::request::reject_request))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Issue routes (protected)
fn issue_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::issue::list_issues).post(handlers::issue::create_issue),
        )
        .route("/:issue_id", get(handlers::issue::get_issue))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/department-consumption",
            get(handlers::reporting::department_consumption),
        )
        .route(
            "/department-consumption/csv",
            get(handlers::reporting::department_consumption_csv),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}
