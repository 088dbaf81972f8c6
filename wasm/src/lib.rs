//! WebAssembly module for the Replenishment Dashboard
//!
//! Provides client-side computation for:
//! - Full recommendation runs over tables already loaded in the browser
//! - SKU and rank label normalization
//! - Quick need and lot calculations for the order form

use chrono::NaiveDate;
use serde::Serialize;
use shared::{
    estimate_need, run_warnings, CoverageAdjustment, Policy, Rank, RecommendationReport,
    ReplenishmentEngine, RunContext, SalesRecord, SkuId, Snapshot, SnapshotTables,
};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;

/// Recommendation output handed back to JavaScript
#[derive(Serialize)]
struct RecommendOutput {
    report: RecommendationReport,
    warnings: Vec<String>,
}

/// Resolve a preset name or a full policy JSON object
fn parse_policy(policy: &str) -> Result<Policy, String> {
    let trimmed = policy.trim();
    let policy = if trimmed.starts_with('{') {
        serde_json::from_str(trimmed).map_err(|e| format!("Invalid policy JSON: {}", e))?
    } else {
        Policy::preset(trimmed).map_err(|e| e.to_string())?
    };
    policy.validate().map_err(|e| e.to_string())?;
    Ok(policy)
}

fn parse_date(as_of: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(as_of.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid as_of date: {}", as_of))
}

fn recommend_output(
    tables_json: &str,
    policy: &str,
    as_of: NaiveDate,
) -> Result<RecommendOutput, String> {
    let tables: SnapshotTables =
        serde_json::from_str(tables_json).map_err(|e| format!("Invalid tables JSON: {}", e))?;
    let snapshot = Snapshot::from_tables(&tables).map_err(|e| e.to_string())?;
    let engine = ReplenishmentEngine::new(parse_policy(policy)?).map_err(|e| e.to_string())?;

    let report = engine.run(&snapshot, RunContext::new(as_of));
    let warnings = run_warnings(&snapshot, &report);
    Ok(RecommendOutput { report, warnings })
}

fn supplier_names_of(report_json: &str) -> Result<Vec<String>, String> {
    let report: RecommendationReport =
        serde_json::from_str(report_json).map_err(|e| format!("Invalid report JSON: {}", e))?;
    Ok(report
        .supplier_batches()
        .into_iter()
        .map(|b| b.supplier_name)
        .collect())
}

fn need_for(
    units_sold: u32,
    stock_available: u32,
    stock_on_order: u32,
    rank_label: &str,
    policy: &str,
) -> Result<u64, String> {
    let policy = parse_policy(policy)?;
    let sales = SalesRecord {
        sku_id: SkuId::parse("0").ok_or("unreachable sku")?,
        units_sold_period: units_sold.into(),
        stock_on_hand: stock_available.into(),
        stock_available: stock_available.into(),
        stock_on_order: stock_on_order.into(),
    };
    let rank = Rank::normalize(Some(rank_label));
    Ok(estimate_need(
        &sales,
        rank,
        &CoverageAdjustment::default(),
        &policy,
    ))
}

fn today() -> NaiveDate {
    let iso = String::from(js_sys::Date::new_0().to_iso_string());
    parse_date(iso.get(..10).unwrap_or(&iso)).unwrap_or_default()
}

/// Run the replenishment engine over tables loaded in the browser.
///
/// `policy` is a preset name or a policy JSON object. An empty `as_of` means
/// today. Returns `{ report, warnings }` as JSON.
#[wasm_bindgen]
pub fn recommend(tables_json: &str, policy: &str, as_of: &str) -> Result<String, JsValue> {
    let as_of = if as_of.trim().is_empty() {
        today()
    } else {
        parse_date(as_of).map_err(|e| JsValue::from_str(&e))?
    };

    let output =
        recommend_output(tables_json, policy, as_of).map_err(|e| JsValue::from_str(&e))?;
    for warning in &output.warnings {
        web_sys::console::warn_1(&JsValue::from_str(warning));
    }

    serde_json::to_string(&output)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize report: {}", e)))
}

/// Normalize a raw SKU cell; returns undefined for unusable codes
#[wasm_bindgen]
pub fn normalize_sku(raw: &str) -> Option<String> {
    SkuId::parse(raw).map(|id| id.as_str().to_string())
}

/// Normalize a free-text rank label to A, B, C, TEST or UNCLASSIFIED
#[wasm_bindgen]
pub fn normalize_rank_label(label: &str) -> String {
    Rank::normalize(Some(label)).to_string()
}

/// Need quantity for one SKU under a preset, ignoring backlog adjustments
#[wasm_bindgen]
pub fn estimate_need_quantity(
    units_sold: u32,
    stock_available: u32,
    stock_on_order: u32,
    rank_label: &str,
    policy: &str,
) -> Result<u32, JsValue> {
    let need = need_for(units_sold, stock_available, stock_on_order, rank_label, policy)
        .map_err(|e| JsValue::from_str(&e))?;
    Ok(u32::try_from(need).unwrap_or(u32::MAX))
}

/// Round a need up to a whole number of lots
#[wasm_bindgen]
pub fn round_up_to_lot(need: u32, lot_size: u32) -> u32 {
    let quantity = shared::round_up_to_lot(need.into(), lot_size.into());
    u32::try_from(quantity).unwrap_or(u32::MAX)
}

/// Supplier names of a report, sorted, as a JSON array
#[wasm_bindgen]
pub fn supplier_names(report_json: &str) -> Result<String, JsValue> {
    let names = supplier_names_of(report_json).map_err(|e| JsValue::from_str(&e))?;
    serde_json::to_string(&names).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn tables_json() -> String {
        json!({
            "sales": [
                {"jan": "123", "quantity_sold": 20, "stock": 5},
                {"jan": "x-1", "quantity_sold": 4, "stock": 0}
            ],
            "offers": [
                {"jan": "123", "maker": "Kobe Import", "order_lot": 10, "unit_price": 100},
                {"jan": "123", "maker": "Osaka Foods", "order_lot": 25, "unit_price": 90}
            ],
            "products": [
                {"jan": "123", "name": "Matcha 100g", "rank": "B"}
            ]
        })
        .to_string()
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[test]
    fn test_recommend_output() {
        let output = recommend_output(&tables_json(), "standard", as_of()).unwrap();
        assert_eq!(output.report.lines.len(), 1);
        assert_eq!(output.report.lines[0].order_quantity, Some(20));
        assert_eq!(output.warnings, vec!["sales: 1 rows rejected"]);

        let json: Value = serde_json::to_value(&output).unwrap();
        assert_eq!(json["report"]["policy"], "standard");
    }

    #[test]
    fn test_policy_json_is_accepted() {
        let policy = serde_json::to_string(&Policy::classic()).unwrap();
        let output = recommend_output(&tables_json(), &policy, as_of()).unwrap();
        assert_eq!(output.report.policy, "classic");
        assert!(parse_policy("aggressive").is_err());
    }

    #[test]
    fn test_supplier_names() {
        let output = recommend_output(&tables_json(), "standard", as_of()).unwrap();
        let report = serde_json::to_string(&output.report).unwrap();
        assert_eq!(supplier_names_of(&report).unwrap(), vec!["Kobe Import"]);
        assert!(supplier_names_of("not json").is_err());
    }

    #[test]
    fn test_normalizers() {
        assert_eq!(normalize_sku("123.0"), Some("123".to_string()));
        assert_eq!(normalize_sku("abc"), None);
        assert_eq!(normalize_rank_label("Ａランク"), "A");
        assert_eq!(normalize_rank_label("テスト"), "TEST");
        assert_eq!(normalize_rank_label(""), "UNCLASSIFIED");
    }

    #[test]
    fn test_need_and_lot_helpers() {
        assert_eq!(need_for(20, 5, 0, "Bランク", "standard").unwrap(), 19);
        assert_eq!(need_for(3, 0, 3, "C", "classic").unwrap(), 1);
        assert_eq!(need_for(0, 0, 0, "A", "standard").unwrap(), 0);
        assert_eq!(round_up_to_lot(19, 10), 20);
        assert_eq!(round_up_to_lot(5, 0), 0);
    }
}
