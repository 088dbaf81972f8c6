//! HTTP handlers for per-SKU inventory lookup

use axum::{
    extract::{Path, State},
    Json,
};
use shared::SkuId;

use crate::error::{AppError, AppResult};
use crate::services::replenishment::{inventory_view, InventoryView};
use crate::AppState;

/// Get sales, stock, offers and backlog for one SKU
pub async fn get_inventory(
    State(state): State<AppState>,
    Path(raw_sku): Path<String>,
) -> AppResult<Json<InventoryView>> {
    let sku_id = SkuId::parse(&raw_sku).ok_or_else(|| AppError::invalid_param("sku_id", &raw_sku))?;

    let snapshot = state.replenishment_service().load_snapshot().await?;
    let view = inventory_view(&snapshot, &sku_id)
        .ok_or_else(|| AppError::NotFound(format!("SKU {}", sku_id)))?;
    Ok(Json(view))
}
