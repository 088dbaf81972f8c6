//! Supplier offer models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::SkuId;

/// A supplier's price for a SKU at a minimum order lot.
///
/// Offers are kept as read; `order_lot_size <= 0` or a missing price marks
/// the offer as not purchasable rather than dropping it at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRecord {
    pub sku_id: SkuId,
    pub supplier_name: String,
    pub order_lot_size: i64,
    pub unit_price: Option<Decimal>,
}

impl OfferRecord {
    pub fn new(
        sku_id: SkuId,
        supplier_name: impl Into<String>,
        order_lot_size: i64,
        unit_price: Decimal,
    ) -> Self {
        Self {
            sku_id,
            supplier_name: supplier_name.into(),
            order_lot_size,
            unit_price: Some(unit_price),
        }
    }

    /// Lot size and price, if this offer can actually be ordered
    pub fn purchasable_terms(&self) -> Option<(u64, Decimal)> {
        let price = self.unit_price.filter(|p| !p.is_sign_negative())?;
        if self.order_lot_size <= 0 {
            return None;
        }
        Some((self.order_lot_size as u64, price))
    }

    pub fn is_purchasable(&self) -> bool {
        self.purchasable_terms().is_some()
    }
}
