//! Auxiliary stock figures shown next to recommendations

use serde::{Deserialize, Serialize};

use crate::types::SkuId;

/// A display-only stock figure, e.g. units held at a secondary warehouse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockOverlay {
    /// Column label the figure is exported under
    pub label: String,
    pub sku_id: SkuId,
    pub quantity: u64,
}
