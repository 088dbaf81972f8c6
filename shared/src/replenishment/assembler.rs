//! Recommendation assembler: joins engine decisions with product metadata

use serde::{Deserialize, Serialize};

use super::{LotSelection, MissingOfferPolicy, NeedAssessment};
use crate::models::{Rank, RecommendationLine, ReportStats, SalesRecord};
use crate::snapshot::SnapshotIndex;

/// Everything the engine decided for one SKU with a positive need
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuDecision {
    pub sales: SalesRecord,
    pub rank: Rank,
    pub need: NeedAssessment,
    pub selection: Option<LotSelection>,
}

/// Build report lines from decisions, preserving their order.
///
/// SKUs without a named product row and discontinued SKUs are counted and
/// dropped. SKUs without a selected offer are dropped or emitted blank
/// according to `missing_offer`.
pub fn assemble(
    decisions: Vec<SkuDecision>,
    index: &SnapshotIndex<'_>,
    missing_offer: MissingOfferPolicy,
    stats: &mut ReportStats,
) -> Vec<RecommendationLine> {
    let mut lines = Vec::with_capacity(decisions.len());

    for decision in decisions {
        let sku_id = &decision.sales.sku_id;

        let Some(meta) = index.meta_for(sku_id).filter(|m| m.is_identified()) else {
            tracing::debug!(sku = %sku_id, "dropping SKU without product name");
            stats.unidentified += 1;
            continue;
        };
        if meta.discontinued {
            stats.discontinued += 1;
            continue;
        }

        if decision.selection.is_none() {
            stats.without_offer += 1;
            if missing_offer == MissingOfferPolicy::Drop {
                continue;
            }
        } else {
            stats.recommended += 1;
        }

        let selection = decision.selection;
        lines.push(RecommendationLine {
            sku_id: sku_id.clone(),
            display_name: meta.display_name.clone(),
            rank: decision.rank,
            units_sold_period: decision.sales.units_sold_period,
            stock: decision.sales.stock_on_hand,
            stock_on_order: decision.sales.stock_on_order,
            computed_need: decision.need.quantity,
            order_quantity: selection.as_ref().map(|s| s.order_quantity),
            chosen_lot_size: selection.as_ref().map(|s| s.lot_size),
            chosen_unit_price: selection.as_ref().map(|s| s.unit_price),
            total_cost: selection.as_ref().map(|s| s.total_cost),
            lot_selection_mode: selection.as_ref().map(|s| s.mode),
            supplier_name: selection.map(|s| s.supplier_name),
            overlays: index.overlays_for(sku_id),
        });
    }

    lines
}
