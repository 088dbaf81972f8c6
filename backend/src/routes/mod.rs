//! Route definitions for the Replenishment Dashboard

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Replenishment reports
        .nest("/replenishment", replenishment_routes())
        // Per-SKU inventory lookup
        .nest("/inventory", inventory_routes())
}

/// Replenishment report routes
fn replenishment_routes() -> Router<AppState> {
    Router::new()
        .route("/policy", get(handlers::get_policy))
        .route("/snapshot", get(handlers::get_snapshot_summary))
        .route("/report", get(handlers::get_report))
        .route("/report/suppliers", get(handlers::list_supplier_batches))
        .route("/report/suppliers/:supplier", get(handlers::get_supplier_batch))
}

/// Inventory routes
fn inventory_routes() -> Router<AppState> {
    Router::new().route("/:sku_id", get(handlers::get_inventory))
}
