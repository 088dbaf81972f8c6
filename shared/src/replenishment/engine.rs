//! Replenishment engine: one pass over a snapshot under one policy

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    assemble, assess_need, CoverageAdjustment, LotSelector, NeedOutcome, Policy, SkuDecision,
};
use crate::error::PolicyError;
use crate::models::{RecommendationReport, ReportStats, SalesRecord};
use crate::snapshot::{Snapshot, SnapshotIndex};

/// Per-run inputs that are not part of the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    /// Reference date for the recent-order window
    pub as_of: NaiveDate,
}

impl RunContext {
    pub fn new(as_of: NaiveDate) -> Self {
        Self { as_of }
    }
}

/// Deterministic replenishment engine.
///
/// Holds no state besides its policy, so repeated runs over the same
/// snapshot produce identical reports.
#[derive(Debug, Clone)]
pub struct ReplenishmentEngine {
    policy: Policy,
}

impl ReplenishmentEngine {
    pub fn new(policy: Policy) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Estimate need and pick an offer for a single SKU
    pub fn evaluate(
        &self,
        sales: &SalesRecord,
        index: &SnapshotIndex<'_>,
        ctx: RunContext,
    ) -> SkuDecision {
        let rank = index
            .meta_for(&sales.sku_id)
            .map(|meta| meta.rank)
            .unwrap_or_default();

        let adjustment = CoverageAdjustment::from_backlog(
            index.orders_for(&sales.sku_id).iter().copied(),
            &self.policy,
            ctx.as_of,
        );
        let need = assess_need(sales, rank, &adjustment, &self.policy);

        let selection = LotSelector::for_rank(&self.policy, rank).select(
            &sales.sku_id,
            need.quantity,
            index.offers_for(&sales.sku_id).iter().copied(),
        );

        SkuDecision {
            sales: sales.clone(),
            rank,
            need,
            selection,
        }
    }

    /// Produce the recommendation report for a snapshot
    pub fn run(&self, snapshot: &Snapshot, ctx: RunContext) -> RecommendationReport {
        let index = snapshot.index();
        let mut stats = ReportStats::default();
        let mut seen = HashSet::new();
        let mut decisions = Vec::new();

        for sales in &snapshot.sales {
            if !seen.insert(&sales.sku_id) {
                stats.duplicate_sales_rows += 1;
                continue;
            }
            stats.skus_evaluated += 1;

            let decision = self.evaluate(sales, &index, ctx);
            match decision.need.outcome {
                NeedOutcome::RecentlyOrdered => stats.recently_ordered += 1,
                NeedOutcome::NoSales => stats.no_sales += 1,
                NeedOutcome::SufficientlyStocked => stats.sufficiently_stocked += 1,
                NeedOutcome::Covered => stats.covered += 1,
                NeedOutcome::FloorProtected => stats.floor_protected += 1,
                NeedOutcome::Required => {}
            }
            if decision.need.quantity > 0 {
                stats.needing_order += 1;
                decisions.push(decision);
            }
        }

        let lines = assemble(decisions, &index, self.policy.missing_offer, &mut stats);

        tracing::info!(
            policy = %self.policy.name,
            as_of = %ctx.as_of,
            evaluated = stats.skus_evaluated,
            needing_order = stats.needing_order,
            recommended = stats.recommended,
            without_offer = stats.without_offer,
            unidentified = stats.unidentified,
            discontinued = stats.discontinued,
            "replenishment run complete"
        );

        RecommendationReport {
            policy: self.policy.name.clone(),
            as_of: ctx.as_of,
            lines,
            stats,
        }
    }
}

/// Human-readable notes about rows a run had to skip
pub fn run_warnings(snapshot: &Snapshot, report: &RecommendationReport) -> Vec<String> {
    let mut warnings: Vec<String> = snapshot
        .table_counts
        .iter()
        .filter(|c| c.rejected > 0)
        .map(|c| format!("{}: {} rows rejected", c.table, c.rejected))
        .collect();
    if report.stats.unidentified > 0 {
        warnings.push(format!(
            "{} SKUs need stock but have no product name",
            report.stats.unidentified
        ));
    }
    if report.stats.duplicate_sales_rows > 0 {
        warnings.push(format!(
            "{} duplicate sales rows ignored",
            report.stats.duplicate_sales_rows
        ));
    }
    warnings
}
