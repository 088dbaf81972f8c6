//! Error types for the replenishment core
//!
//! Bad cell values never raise; they are coerced at the snapshot boundary.
//! Only structurally broken input and invalid policies are errors.

use thiserror::Error;

/// Structural problems with the input tables
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("table '{table}' is missing required columns: {}", .columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    #[error("table '{table}' row {row} is not an object")]
    MalformedRow { table: String, row: usize },
}

/// Invalid policy parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("unknown policy preset: {0}")]
    UnknownPreset(String),

    #[error("rank multiplier for {rank} must be positive, got {value}")]
    NonPositiveMultiplier { rank: String, value: String },

    #[error("rank multiplier for {rank} must be at most {max}, got {value}")]
    MultiplierTooLarge { rank: String, value: String, max: String },

    #[error("reorder fraction for {rank} must not be negative, got {value}")]
    NegativeReorderFraction { rank: String, value: String },

    #[error("reorder fraction for {rank} must be at most {max}, got {value}")]
    ReorderFractionTooLarge { rank: String, value: String, max: String },

    #[error("near-excess factor must be between 1 and {max}, got {value}")]
    NearExcessFactorOutOfRange { value: String, max: String },

    #[error("min-total-cost lot selection must apply to every rank or none")]
    MixedCostMode,
}
