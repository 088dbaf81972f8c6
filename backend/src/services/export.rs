//! CSV export for recommendation reports and supplier batches
//!
//! Files are written with a UTF-8 byte order mark so spreadsheet tools open
//! Japanese product names correctly.

use chrono::NaiveDate;
use serde::Serialize;
use shared::{RecommendationLine, RecommendationReport, SupplierBatch};

use crate::error::{AppError, AppResult};

/// UTF-8 byte order mark
pub const BOM: &str = "\u{feff}";

/// Fixed columns, in export order. Overlay columns follow these.
pub const COLUMNS: [&str; 13] = [
    "sku_id",
    "display_name",
    "rank",
    "units_sold_period",
    "stock",
    "stock_on_order",
    "computed_need",
    "supplier_name",
    "chosen_lot_size",
    "chosen_unit_price",
    "order_quantity",
    "total_cost",
    "lot_selection_mode",
];

/// Per-supplier totals listed before downloading batches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierSummary {
    pub supplier_name: String,
    pub line_count: usize,
    pub total_units: u64,
    pub total_cost: rust_decimal::Decimal,
    pub file_name: String,
}

/// Export service
pub struct ExportService;

impl ExportService {
    /// Full report as CSV, lines in report order
    pub fn report_csv(report: &RecommendationReport) -> AppResult<String> {
        let overlay_labels = report.overlay_labels();
        Self::lines_csv(report.lines.iter(), &overlay_labels)
    }

    /// One supplier batch as CSV
    pub fn batch_csv(batch: &SupplierBatch, overlay_labels: &[String]) -> AppResult<String> {
        Self::lines_csv(batch.lines.iter(), overlay_labels)
    }

    pub fn summaries(report: &RecommendationReport) -> Vec<SupplierSummary> {
        report
            .supplier_batches()
            .into_iter()
            .map(|batch| SupplierSummary {
                file_name: batch_file_name(report.as_of, &batch.supplier_name),
                line_count: batch.lines.len(),
                total_units: batch.total_units,
                total_cost: batch.total_cost,
                supplier_name: batch.supplier_name,
            })
            .collect()
    }

    fn lines_csv<'a>(
        lines: impl Iterator<Item = &'a RecommendationLine>,
        overlay_labels: &[String],
    ) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(BOM.as_bytes().to_vec());

        let header = COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(overlay_labels.iter().cloned());
        wtr.write_record(header)
            .map_err(|e| AppError::Export(format!("CSV header error: {}", e)))?;

        for line in lines {
            wtr.write_record(record(line, overlay_labels))
                .map_err(|e| AppError::Export(format!("CSV serialization error: {}", e)))?;
        }

        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Export(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Export(format!("UTF-8 conversion error: {}", e)))
    }
}

fn record(line: &RecommendationLine, overlay_labels: &[String]) -> Vec<String> {
    fn opt<T: ToString>(value: &Option<T>) -> String {
        value.as_ref().map(ToString::to_string).unwrap_or_default()
    }

    let mut fields = vec![
        line.sku_id.to_string(),
        line.display_name.clone(),
        line.rank.to_string(),
        line.units_sold_period.to_string(),
        line.stock.to_string(),
        line.stock_on_order.to_string(),
        line.computed_need.to_string(),
        opt(&line.supplier_name),
        opt(&line.chosen_lot_size),
        opt(&line.chosen_unit_price),
        opt(&line.order_quantity),
        opt(&line.total_cost),
        opt(&line.lot_selection_mode),
    ];
    fields.extend(
        overlay_labels
            .iter()
            .map(|label| line.overlays.get(label).copied().unwrap_or(0).to_string()),
    );
    fields
}

/// Replace characters that are not allowed in file names
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned.to_string()
    }
}

pub fn report_file_name(as_of: NaiveDate) -> String {
    format!("replenishment_{}.csv", as_of.format("%Y%m%d"))
}

pub fn batch_file_name(as_of: NaiveDate, supplier_name: &str) -> String {
    format!(
        "replenishment_{}_{}.csv",
        as_of.format("%Y%m%d"),
        sanitize_file_name(supplier_name)
    )
}
