//! Replenishment service: reads the store and runs the engine

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use shared::{
    run_warnings, OfferRecord, Policy, PurchaseOrder, RecommendationReport, ReplenishmentEngine,
    RunContext, SalesRecord, SkuId, SkuMeta, Snapshot, SnapshotTables, TableCount,
};
use uuid::Uuid;

use crate::config::TablesConfig;
use crate::error::AppResult;
use crate::external::StoreClient;

/// A report together with run bookkeeping
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Rows the run skipped, for display next to the report
    pub warnings: Vec<String>,
    #[serde(flatten)]
    pub report: RecommendationReport,
}

/// Row counts per table, for checking that the store is populated
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotSummary {
    pub tables: Vec<TableCount>,
    pub distinct_sales_skus: usize,
    pub purchasable_offers: usize,
}

/// Everything known about one SKU
#[derive(Debug, Clone, Serialize)]
pub struct InventoryView {
    pub sku_id: SkuId,
    pub product: Option<SkuMeta>,
    pub sales: Option<SalesRecord>,
    pub offers: Vec<OfferRecord>,
    pub purchase_orders: Vec<PurchaseOrder>,
    pub overlays: BTreeMap<String, u64>,
}

/// Replenishment service
#[derive(Clone)]
pub struct ReplenishmentService {
    store: StoreClient,
    tables: TablesConfig,
    policy: Policy,
}

impl ReplenishmentService {
    pub fn new(store: StoreClient, tables: TablesConfig, policy: Policy) -> Self {
        Self {
            store,
            tables,
            policy,
        }
    }

    /// Read every configured table in full
    pub async fn fetch_tables(&self) -> AppResult<SnapshotTables> {
        let (sales, offers, products) = tokio::try_join!(
            self.store.fetch_table(&self.tables.sales),
            self.store.fetch_table(&self.tables.offers),
            self.store.fetch_table(&self.tables.products),
        )?;

        let purchase_orders = match &self.tables.purchase_orders {
            Some(table) => self.store.fetch_table(table).await?,
            None => Vec::new(),
        };

        let mut overlays = BTreeMap::new();
        for (label, table) in &self.tables.overlays {
            overlays.insert(label.clone(), self.store.fetch_table(table).await?);
        }

        Ok(SnapshotTables {
            sales,
            offers,
            products,
            purchase_orders,
            overlays,
        })
    }

    pub async fn load_snapshot(&self) -> AppResult<Snapshot> {
        let tables = self.fetch_tables().await?;
        Ok(Snapshot::from_tables(&tables)?)
    }

    /// Fetch the store and produce a report for `as_of`
    pub async fn generate(&self, as_of: NaiveDate) -> AppResult<GeneratedReport> {
        let snapshot = self.load_snapshot().await?;
        generate_report(&self.policy, &snapshot, as_of)
    }
}

/// Run the engine over a loaded snapshot
pub fn generate_report(
    policy: &Policy,
    snapshot: &Snapshot,
    as_of: NaiveDate,
) -> AppResult<GeneratedReport> {
    let engine = ReplenishmentEngine::new(policy.clone())?;
    let run_id = Uuid::new_v4();
    tracing::info!(%run_id, policy = %policy.name, %as_of, "generating replenishment report");

    let report = engine.run(snapshot, RunContext::new(as_of));
    if report.stats.unidentified > 0 {
        tracing::warn!(
            %run_id,
            unidentified = report.stats.unidentified,
            "SKUs need stock but have no product name"
        );
    }
    let warnings = run_warnings(snapshot, &report);
    for warning in &warnings {
        tracing::warn!(%run_id, "{}", warning);
    }

    Ok(GeneratedReport {
        run_id,
        generated_at: Utc::now(),
        warnings,
        report,
    })
}

pub fn summarize(snapshot: &Snapshot) -> SnapshotSummary {
    let mut skus: Vec<&SkuId> = snapshot.sales.iter().map(|s| &s.sku_id).collect();
    skus.sort();
    skus.dedup();

    SnapshotSummary {
        tables: snapshot.table_counts.clone(),
        distinct_sales_skus: skus.len(),
        purchasable_offers: snapshot.offers.iter().filter(|o| o.is_purchasable()).count(),
    }
}

/// Collect one SKU's rows; `None` when no table mentions it
pub fn inventory_view(snapshot: &Snapshot, sku_id: &SkuId) -> Option<InventoryView> {
    let index = snapshot.index();
    let view = InventoryView {
        sku_id: sku_id.clone(),
        product: index.meta_for(sku_id).cloned(),
        sales: snapshot.sales.iter().find(|s| &s.sku_id == sku_id).cloned(),
        offers: index.offers_for(sku_id).iter().map(|o| (*o).clone()).collect(),
        purchase_orders: index.orders_for(sku_id).iter().map(|o| (*o).clone()).collect(),
        overlays: index.overlays_for(sku_id),
    };

    let known = view.product.is_some()
        || view.sales.is_some()
        || !view.offers.is_empty()
        || !view.purchase_orders.is_empty();
    known.then_some(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::Rank;

    fn sku(id: &str) -> SkuId {
        SkuId::parse(id).unwrap()
    }

    fn snapshot() -> Snapshot {
        Snapshot::new(
            vec![
                SalesRecord::new(sku("123"), 20).with_stock(5),
                SalesRecord::new(sku("123"), 1),
                SalesRecord::new(sku("456"), 0),
            ],
            vec![
                OfferRecord::new(sku("123"), "Kobe Import", 10, Decimal::from(100)),
                OfferRecord::new(sku("456"), "Osaka Foods", 0, Decimal::from(90)),
            ],
            vec![SkuMeta::new(sku("123"), "Matcha 100g", Rank::B)],
        )
    }

    #[test]
    fn test_generate_report() {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let generated = generate_report(&Policy::standard(), &snapshot(), as_of).unwrap();
        assert_eq!(generated.report.as_of, as_of);
        assert_eq!(generated.report.lines.len(), 1);
        assert_eq!(generated.report.lines[0].order_quantity, Some(20));

        let json = serde_json::to_value(&generated).unwrap();
        assert_eq!(json["policy"], "standard");
        assert!(json["run_id"].is_string());
    }

    #[test]
    fn test_generate_report_warns_about_unidentified() {
        let mut snapshot = snapshot();
        snapshot.products.clear();
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let generated = generate_report(&Policy::standard(), &snapshot, as_of).unwrap();

        assert!(generated.report.lines.is_empty());
        assert_eq!(generated.report.stats.unidentified, 1);
        assert!(generated
            .warnings
            .contains(&"1 SKUs need stock but have no product name".to_string()));

        let json = serde_json::to_value(&generated).unwrap();
        assert_eq!(json["stats"]["unidentified"], 1);
        assert!(json["warnings"].is_array());
    }

    #[test]
    fn test_generate_rejects_invalid_policy() {
        let mut policy = Policy::standard();
        policy.multipliers.a = Decimal::ZERO;
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert!(generate_report(&policy, &snapshot(), as_of).is_err());
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&snapshot());
        assert_eq!(summary.distinct_sales_skus, 2);
        assert_eq!(summary.purchasable_offers, 1);
    }

    #[test]
    fn test_inventory_view() {
        let snapshot = snapshot();
        let view = inventory_view(&snapshot, &sku("123")).unwrap();
        assert_eq!(view.product.unwrap().display_name, "Matcha 100g");
        assert_eq!(view.sales.unwrap().units_sold_period, 20);
        assert_eq!(view.offers.len(), 1);

        assert!(inventory_view(&snapshot, &sku("999")).is_none());
    }
}
