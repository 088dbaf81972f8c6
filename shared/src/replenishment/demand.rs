//! Demand estimator: how many units a SKU needs

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Policy;
use crate::models::{PurchaseOrder, Rank, SalesRecord};

/// Backlog facts that adjust a SKU's coverage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageAdjustment {
    /// On-order units that must not count as coverage
    pub excluded_on_order: u64,
    /// An order was placed inside the recent-order window
    pub ordered_recently: bool,
}

impl CoverageAdjustment {
    /// Derive the adjustment from a SKU's open orders
    pub fn from_backlog<'a>(
        orders: impl IntoIterator<Item = &'a PurchaseOrder>,
        policy: &Policy,
        as_of: NaiveDate,
    ) -> Self {
        let mut adjustment = Self::default();
        for order in orders {
            if order.is_via_any(&policy.excluded_channels) {
                adjustment.excluded_on_order =
                    adjustment.excluded_on_order.saturating_add(order.quantity);
            }
            if let Some(window) = policy.recent_order_window_days {
                adjustment.ordered_recently |= order.is_recent(as_of, window);
            }
        }
        adjustment
    }
}

/// Why the estimator arrived at its quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeedOutcome {
    RecentlyOrdered,
    NoSales,
    /// Coverage is above the reorder point
    SufficientlyStocked,
    /// Coverage already meets the baseline requirement
    Covered,
    /// Near-empty shelf with live sales; need forced to the minimum
    FloorProtected,
    Required,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeedAssessment {
    pub quantity: u64,
    pub outcome: NeedOutcome,
    /// Period sales scaled by the rank multiplier, rounded up
    pub baseline: u64,
    /// Available stock plus countable on-order units
    pub coverage: u64,
}

impl NeedAssessment {
    fn zero(outcome: NeedOutcome) -> Self {
        Self {
            quantity: 0,
            outcome,
            baseline: 0,
            coverage: 0,
        }
    }
}

/// Estimate the need quantity for one SKU
pub fn estimate_need(
    sales: &SalesRecord,
    rank: Rank,
    adjustment: &CoverageAdjustment,
    policy: &Policy,
) -> u64 {
    assess_need(sales, rank, adjustment, policy).quantity
}

/// Estimate the need quantity and report which rule decided it
pub fn assess_need(
    sales: &SalesRecord,
    rank: Rank,
    adjustment: &CoverageAdjustment,
    policy: &Policy,
) -> NeedAssessment {
    if adjustment.ordered_recently {
        return NeedAssessment::zero(NeedOutcome::RecentlyOrdered);
    }
    if !sales.has_sales() {
        return NeedAssessment::zero(NeedOutcome::NoSales);
    }

    let sold = Decimal::from(sales.units_sold_period);
    let baseline = sold
        .checked_mul(policy.multiplier(rank))
        .and_then(|scaled| scaled.ceil().to_u64())
        .unwrap_or(u64::MAX);

    let countable_on_order = sales
        .stock_on_order
        .saturating_sub(adjustment.excluded_on_order);
    let coverage = sales.stock_available.saturating_add(countable_on_order);
    let naive = baseline.saturating_sub(coverage);

    let above_reorder_point = policy
        .reorder_fraction(rank)
        .and_then(|fraction| sold.checked_mul(fraction))
        .map(|reorder_point| Decimal::from(coverage) > reorder_point)
        .unwrap_or(false);

    let (quantity, outcome) = if above_reorder_point {
        (0, NeedOutcome::SufficientlyStocked)
    } else if naive == 0 {
        (0, NeedOutcome::Covered)
    } else {
        (naive, NeedOutcome::Required)
    };

    // Floor protection wins over the reorder gate
    if quantity == 0 && sales.stock_available <= policy.floor_stock_threshold {
        return NeedAssessment {
            quantity: 1,
            outcome: NeedOutcome::FloorProtected,
            baseline,
            coverage,
        };
    }

    NeedAssessment {
        quantity,
        outcome,
        baseline,
        coverage,
    }
}
