//! Sales and stock snapshot models

use serde::{Deserialize, Serialize};

use crate::types::SkuId;

/// One SKU's sales volume and stock position for the reporting period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub sku_id: SkuId,
    pub units_sold_period: u64,
    pub stock_on_hand: u64,
    /// Stock that is free to sell (on hand minus allocations)
    pub stock_available: u64,
    pub stock_on_order: u64,
}

impl SalesRecord {
    pub fn new(sku_id: SkuId, units_sold_period: u64) -> Self {
        Self {
            sku_id,
            units_sold_period,
            stock_on_hand: 0,
            stock_available: 0,
            stock_on_order: 0,
        }
    }

    /// Set both on-hand and available stock
    pub fn with_stock(mut self, stock: u64) -> Self {
        self.stock_on_hand = stock;
        self.stock_available = stock;
        self
    }

    pub fn with_stock_available(mut self, stock_available: u64) -> Self {
        self.stock_available = stock_available;
        self
    }

    pub fn with_on_order(mut self, stock_on_order: u64) -> Self {
        self.stock_on_order = stock_on_order;
        self
    }

    pub fn has_sales(&self) -> bool {
        self.units_sold_period > 0
    }
}
