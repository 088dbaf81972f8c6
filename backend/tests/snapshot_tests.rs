//! Snapshot boundary tests
//!
//! Tests for converting raw store rows into typed records including:
//! - Column aliases used by the hosted tables
//! - Coercion of messy numeric cells
//! - Fail-fast structural errors
//! - End-to-end runs from raw rows

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use shared::{
    coerce_quantity, normalize_sku_id, Policy, Rank, ReplenishmentEngine, RunContext, SkuId,
    Snapshot, SnapshotError, SnapshotTables,
};
use std::collections::BTreeMap;

fn tables() -> SnapshotTables {
    SnapshotTables {
        sales: vec![
            json!({"jan": "4901234567890", "quantity_sold": 20, "stock": 5}),
            json!({"jan": 4901234567891_u64, "quantity_sold": "3", "stock": "0", "stock_on_order": 3}),
            json!({"jan": "4901234567892.0", "quantity_sold": null, "stock": 10}),
        ],
        offers: vec![
            json!({"jan": "4901234567890", "maker": "Kobe Import", "order_lot": 10, "unit_price": 100}),
            json!({"jan": "4901234567890", "maker": "Osaka Foods", "order_lot": "25", "unit_price": "90"}),
            json!({"jan": "4901234567891", "maker": "Kyoto Tea", "order_lot": 1, "unit_price": 50}),
        ],
        products: vec![
            json!({"jan": "4901234567890", "name": "抹茶 100g", "rank": "Bランク"}),
            json!({"jan": "4901234567891", "name": "煎茶", "rank": "ランクC"}),
            json!({"jan": "4901234567892", "name": "ほうじ茶", "rank": "Ａ"}),
        ],
        purchase_orders: Vec::new(),
        overlays: BTreeMap::new(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_store_shaped_rows_are_accepted() {
        let snapshot = Snapshot::from_tables(&tables()).unwrap();
        assert_eq!(snapshot.sales.len(), 3);
        assert_eq!(snapshot.sales[2].sku_id.as_str(), "4901234567892");
        assert_eq!(snapshot.sales[2].units_sold_period, 0);
        assert_eq!(snapshot.offers[1].order_lot_size, 25);
        assert_eq!(snapshot.products[0].rank, Rank::B);
        assert_eq!(snapshot.products[1].rank, Rank::C);
        assert_eq!(snapshot.products[2].rank, Rank::A);
    }

    #[test]
    fn test_end_to_end_run() {
        let snapshot = Snapshot::from_tables(&tables()).unwrap();
        let engine = ReplenishmentEngine::new(Policy::standard()).unwrap();
        let report = engine.run(
            &snapshot,
            RunContext::new(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()),
        );

        assert_eq!(report.lines.len(), 2);
        assert_eq!(report.lines[0].display_name, "抹茶 100g");
        assert_eq!(report.lines[0].order_quantity, Some(20));
        assert_eq!(report.lines[1].order_quantity, Some(1));
        assert_eq!(report.lines[1].total_cost, Some(Decimal::from(50)));
        assert_eq!(report.stats.no_sales, 1);

        let suppliers: Vec<String> = report
            .supplier_batches()
            .into_iter()
            .map(|b| b.supplier_name)
            .collect();
        assert_eq!(suppliers, vec!["Kobe Import", "Kyoto Tea"]);
    }

    #[test]
    fn test_missing_sales_column() {
        let mut raw = tables();
        raw.sales = vec![json!({"jan": "1", "stock": 4})];
        match Snapshot::from_tables(&raw) {
            Err(SnapshotError::MissingColumns { table, columns }) => {
                assert_eq!(table, "sales");
                assert_eq!(columns, vec!["units_sold".to_string()]);
            }
            other => panic!("expected missing column error, got {:?}", other),
        }
    }

    #[test]
    fn test_overlay_is_display_only() {
        let mut raw = tables();
        raw.overlays.insert(
            "warehouse_b".to_string(),
            vec![json!({"jan": "4901234567890", "stock": 500})],
        );
        let snapshot = Snapshot::from_tables(&raw).unwrap();
        let engine = ReplenishmentEngine::new(Policy::standard()).unwrap();
        let report = engine.run(
            &snapshot,
            RunContext::new(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()),
        );

        let line = &report.lines[0];
        assert_eq!(line.computed_need, 19);
        assert_eq!(line.overlays.get("warehouse_b"), Some(&500));
        assert_eq!(report.overlay_labels(), vec!["warehouse_b".to_string()]);
    }

    #[test]
    fn test_oversized_cells_do_not_abort_run() {
        let raw = SnapshotTables {
            sales: vec![
                json!({"jan": "1", "units_sold": 10_000_000_000_u64, "stock": 0}),
                json!({"jan": "2", "units_sold": 10_000_000_000_u64, "stock": 0}),
            ],
            offers: vec![
                json!({"jan": "1", "maker": "Huge", "order_lot": 1, "unit_price": "100000000000000000000"}),
                json!({"jan": "1", "maker": "Fair", "order_lot": 10, "unit_price": 100}),
                json!({"jan": "2", "maker": "Huge", "order_lot": 1, "unit_price": "100000000000000000000"}),
            ],
            products: vec![
                json!({"jan": "1", "name": "Tea", "rank": "C"}),
                json!({"jan": "2", "name": "Coffee", "rank": "C"}),
            ],
            ..SnapshotTables::default()
        };
        let snapshot = Snapshot::from_tables(&raw).unwrap();

        for policy in [Policy::standard(), Policy::classic()] {
            let report = ReplenishmentEngine::new(policy).unwrap().run(
                &snapshot,
                RunContext::new(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()),
            );
            assert_eq!(report.lines.len(), 1);
            assert_eq!(report.lines[0].supplier_name.as_deref(), Some("Fair"));
            assert_eq!(report.lines[0].order_quantity, Some(10_000_000_000));
            assert_eq!(report.stats.without_offer, 1);
        }
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating arbitrary scalar cells
    fn cell_strategy() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            (-1.0e9f64..1.0e9f64).prop_map(|f| json!(f)),
            "[0-9a-d ,.-]{0,12}".prop_map(Value::String),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Quantity coercion never panics and ignores negatives
        #[test]
        fn prop_quantity_coercion_total(cell in cell_strategy()) {
            let quantity = coerce_quantity(&cell);
            if let Some(n) = cell.as_i64() {
                prop_assert_eq!(quantity, n.max(0) as u64);
            }
        }

        /// Integer codes normalize the same whether sent as number or string
        #[test]
        fn prop_sku_normalization_consistent(code in 0u64..10_000_000_000_000u64) {
            let from_number = normalize_sku_id(&json!(code));
            let from_string = normalize_sku_id(&json!(code.to_string()));
            let from_float_string = normalize_sku_id(&json!(format!("{}.0", code)));
            prop_assert_eq!(from_number.clone(), from_string);
            prop_assert_eq!(from_number.clone(), from_float_string);
            prop_assert_eq!(from_number, SkuId::parse(&code.to_string()));
        }

        /// Unidentifiable rows are skipped, never fatal
        #[test]
        fn prop_bad_rows_are_counted(cells in prop::collection::vec(cell_strategy(), 1..10)) {
            let raw = SnapshotTables {
                sales: cells
                    .iter()
                    .map(|cell| json!({"sku_id": cell, "units_sold": cell}))
                    .collect(),
                ..SnapshotTables::default()
            };
            let snapshot = Snapshot::from_tables(&raw).unwrap();
            let count = &snapshot.table_counts[0];
            prop_assert_eq!(count.rows, cells.len());
            prop_assert_eq!(count.rows - count.rejected, snapshot.sales.len());
        }
    }
}
