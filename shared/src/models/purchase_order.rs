//! Open purchase-order backlog models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::SkuId;

/// An order already placed with a supplier and not yet received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub sku_id: SkuId,
    pub quantity: u64,
    /// Supplier or routing channel the order went through
    pub channel: Option<String>,
    pub ordered_on: Option<NaiveDate>,
}

impl PurchaseOrder {
    pub fn new(sku_id: SkuId, quantity: u64) -> Self {
        Self {
            sku_id,
            quantity,
            channel: None,
            ordered_on: None,
        }
    }

    pub fn via(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.ordered_on = Some(date);
        self
    }

    /// Channel match ignoring case and surrounding whitespace
    pub fn is_via_any(&self, channels: &[String]) -> bool {
        let Some(channel) = self.channel.as_deref() else {
            return false;
        };
        let channel = channel.trim();
        channels
            .iter()
            .any(|c| c.trim().eq_ignore_ascii_case(channel))
    }

    /// Whether the order was placed within `window_days` before `as_of`.
    /// Orders dated after `as_of` count as recent as well.
    pub fn is_recent(&self, as_of: NaiveDate, window_days: u32) -> bool {
        match self.ordered_on {
            Some(date) => (as_of - date).num_days() <= i64::from(window_days),
            None => false,
        }
    }
}
