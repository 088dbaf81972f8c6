//! Replenishment report handlers

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use shared::Policy;

use crate::error::{AppError, AppResult};
use crate::services::export::{batch_file_name, report_file_name, SupplierSummary};
use crate::services::replenishment::{summarize, SnapshotSummary};
use crate::services::ExportService;
use crate::AppState;

#[derive(Deserialize)]
pub struct ReportQuery {
    /// Run date as YYYY-MM-DD; defaults to today (UTC)
    pub as_of: Option<String>,
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
}

impl ReportQuery {
    pub fn as_of(&self) -> AppResult<NaiveDate> {
        match self.as_of.as_deref().map(str::trim) {
            None | Some("") => Ok(Utc::now().date_naive()),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| AppError::invalid_param("as_of", raw)),
        }
    }

    pub fn format(&self) -> AppResult<ReportFormat> {
        match self.format.as_deref().map(|f| f.trim().to_lowercase()).as_deref() {
            None | Some("") | Some("json") => Ok(ReportFormat::Json),
            Some("csv") => Ok(ReportFormat::Csv),
            Some(other) => Err(AppError::invalid_param("format", other)),
        }
    }
}

fn csv_response(csv: String, file_name: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        csv,
    )
        .into_response()
}

/// Get the active policy
pub async fn get_policy(State(state): State<AppState>) -> Json<Policy> {
    Json(state.policy.as_ref().clone())
}

/// Get row counts for every input table
pub async fn get_snapshot_summary(
    State(state): State<AppState>,
) -> AppResult<Json<SnapshotSummary>> {
    let snapshot = state.replenishment_service().load_snapshot().await?;
    Ok(Json(summarize(&snapshot)))
}

/// Generate the full recommendation report
pub async fn get_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let as_of = query.as_of()?;
    let format = query.format()?;

    let generated = state.replenishment_service().generate(as_of).await?;

    match format {
        ReportFormat::Csv => {
            let csv = ExportService::report_csv(&generated.report)?;
            Ok(csv_response(csv, &report_file_name(as_of)))
        }
        ReportFormat::Json => Ok(Json(generated).into_response()),
    }
}

/// List supplier batches with their totals
pub async fn list_supplier_batches(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<Vec<SupplierSummary>>> {
    let as_of = query.as_of()?;
    let generated = state.replenishment_service().generate(as_of).await?;
    Ok(Json(ExportService::summaries(&generated.report)))
}

/// Get one supplier's batch
pub async fn get_supplier_batch(
    State(state): State<AppState>,
    Path(supplier): Path<String>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let as_of = query.as_of()?;
    let format = query.format()?;

    let generated = state.replenishment_service().generate(as_of).await?;
    let batch = generated
        .report
        .batch_for(&supplier)
        .ok_or_else(|| AppError::NotFound(format!("Supplier batch {}", supplier)))?;

    match format {
        ReportFormat::Csv => {
            let csv = ExportService::batch_csv(&batch, &generated.report.overlay_labels())?;
            Ok(csv_response(csv, &batch_file_name(as_of, &supplier)))
        }
        ReportFormat::Json => Ok(Json(batch).into_response()),
    }
}
