//! Error handling for the Replenishment Dashboard
//!
//! Provides consistent error responses in Japanese and English

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{PolicyError, SnapshotError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_ja: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Input data errors
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    // External service errors
    #[error("Store error: {0}")]
    Store(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    // Export errors
    #[error("Export error: {0}")]
    Export(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_ja: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    /// Shorthand for a query or path parameter that failed to parse
    pub fn invalid_param(field: &str, value: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: format!("Invalid value for {}: {}", field, value),
            message_ja: format!("{} の値が不正です: {}", field, value),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Snapshot(_) | AppError::Policy(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(_) => StatusCode::BAD_GATEWAY,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Export(_) | AppError::Internal(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_detail = match &self {
            AppError::Validation {
                field,
                message,
                message_ja,
            } => ErrorDetail {
                code: "VALIDATION_ERROR".to_string(),
                message_en: message.clone(),
                message_ja: message_ja.clone(),
                field: Some(field.clone()),
            },
            AppError::NotFound(resource) => ErrorDetail {
                code: "NOT_FOUND".to_string(),
                message_en: format!("{} not found", resource),
                message_ja: format!("{} が見つかりません", resource),
                field: None,
            },
            AppError::Snapshot(err) => ErrorDetail {
                code: "SNAPSHOT_ERROR".to_string(),
                message_en: err.to_string(),
                message_ja: format!("入力データの形式が不正です: {}", err),
                field: None,
            },
            AppError::Policy(err) => ErrorDetail {
                code: "POLICY_ERROR".to_string(),
                message_en: err.to_string(),
                message_ja: format!("発注ポリシーの設定が不正です: {}", err),
                field: None,
            },
            AppError::Store(msg) => ErrorDetail {
                code: "STORE_ERROR".to_string(),
                message_en: format!("Store error: {}", msg),
                message_ja: format!("データストアでエラーが発生しました: {}", msg),
                field: None,
            },
            AppError::StoreUnavailable(_) => ErrorDetail {
                code: "STORE_UNAVAILABLE".to_string(),
                message_en: "The data store is temporarily unavailable".to_string(),
                message_ja: "データストアに一時的に接続できません".to_string(),
                field: None,
            },
            AppError::Export(msg) => ErrorDetail {
                code: "EXPORT_ERROR".to_string(),
                message_en: format!("Export error: {}", msg),
                message_ja: format!("エクスポートに失敗しました: {}", msg),
                field: None,
            },
            AppError::Internal(msg) => ErrorDetail {
                code: "INTERNAL_ERROR".to_string(),
                message_en: msg.clone(),
                message_ja: "サーバー内部でエラーが発生しました".to_string(),
                field: None,
            },
            AppError::InternalError(_) => ErrorDetail {
                code: "INTERNAL_ERROR".to_string(),
                message_en: "An internal server error occurred".to_string(),
                message_ja: "サーバー内部でエラーが発生しました".to_string(),
                field: None,
            },
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (self.status(), Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::invalid_param("as_of", "yesterday").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("SKU 123".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(PolicyError::MixedCostMode).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Store("401 Unauthorized".to_string()).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_snapshot_error_converts() {
        let err: AppError = SnapshotError::MissingColumns {
            table: "sales".to_string(),
            columns: vec!["units_sold".to_string()],
        }
        .into();
        assert!(err.to_string().contains("units_sold"));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
