//! Recommendation output models

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Rank;
use crate::replenishment::LotSelectionMode;
use crate::types::SkuId;

/// One reorder recommendation, ready for export.
///
/// The order fields are all set or all empty. They are empty only when the
/// run emits SKUs without a purchasable offer for manual review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationLine {
    pub sku_id: SkuId,
    pub display_name: String,
    pub rank: Rank,
    pub units_sold_period: u64,
    pub stock: u64,
    pub stock_on_order: u64,
    pub computed_need: u64,
    pub order_quantity: Option<u64>,
    pub chosen_lot_size: Option<u64>,
    pub chosen_unit_price: Option<Decimal>,
    pub total_cost: Option<Decimal>,
    pub supplier_name: Option<String>,
    pub lot_selection_mode: Option<LotSelectionMode>,
    /// Display-only stock figures keyed by overlay label
    #[serde(default)]
    pub overlays: BTreeMap<String, u64>,
}

impl RecommendationLine {
    pub fn has_order(&self) -> bool {
        self.order_quantity.is_some()
    }
}

/// Counters describing what happened to each SKU during a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStats {
    pub skus_evaluated: usize,
    /// Extra sales rows for an already evaluated SKU (first row wins)
    pub duplicate_sales_rows: usize,
    pub no_sales: usize,
    pub recently_ordered: usize,
    pub sufficiently_stocked: usize,
    pub covered: usize,
    pub floor_protected: usize,
    pub needing_order: usize,
    pub without_offer: usize,
    pub unidentified: usize,
    pub discontinued: usize,
    pub recommended: usize,
}

/// Result of one replenishment run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    /// Name of the policy that produced the report
    pub policy: String,
    pub as_of: NaiveDate,
    pub lines: Vec<RecommendationLine>,
    pub stats: ReportStats,
}

/// The lines of one supplier, exported as an independent batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierBatch {
    pub supplier_name: String,
    pub lines: Vec<RecommendationLine>,
    pub total_units: u64,
    pub total_cost: Decimal,
}

impl RecommendationReport {
    /// Lines grouped by supplier name, each group sorted by sku_id
    pub fn supplier_batches(&self) -> Vec<SupplierBatch> {
        let mut groups: BTreeMap<&str, Vec<&RecommendationLine>> = BTreeMap::new();
        for line in &self.lines {
            if let (Some(supplier), true) = (line.supplier_name.as_deref(), line.has_order()) {
                groups.entry(supplier).or_default().push(line);
            }
        }

        groups
            .into_iter()
            .map(|(supplier, mut lines)| {
                lines.sort_by(|a, b| a.sku_id.cmp(&b.sku_id));
                let total_units = lines
                    .iter()
                    .filter_map(|l| l.order_quantity)
                    .fold(0u64, u64::saturating_add);
                let total_cost = saturating_cost(lines.iter().copied());
                SupplierBatch {
                    supplier_name: supplier.to_string(),
                    lines: lines.into_iter().cloned().collect(),
                    total_units,
                    total_cost,
                }
            })
            .collect()
    }

    /// The batch for a single supplier, if it has any lines
    pub fn batch_for(&self, supplier_name: &str) -> Option<SupplierBatch> {
        self.supplier_batches()
            .into_iter()
            .find(|b| b.supplier_name == supplier_name)
    }

    /// Lines kept for review without a purchasable offer
    pub fn unassigned(&self) -> Vec<&RecommendationLine> {
        self.lines.iter().filter(|l| !l.has_order()).collect()
    }

    /// Distinct overlay labels across all lines, sorted
    pub fn overlay_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .lines
            .iter()
            .flat_map(|l| l.overlays.keys().cloned())
            .collect();
        labels.sort();
        labels.dedup();
        labels
    }

    pub fn total_cost(&self) -> Decimal {
        saturating_cost(self.lines.iter())
    }
}

fn saturating_cost<'a>(lines: impl Iterator<Item = &'a RecommendationLine>) -> Decimal {
    lines
        .filter_map(|l| l.total_cost)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}
