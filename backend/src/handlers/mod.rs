//! HTTP handlers for the Replenishment Dashboard

pub mod health;
pub mod inventory;
pub mod replenishment;

pub use health::health_check;
pub use inventory::get_inventory;
pub use replenishment::{
    get_policy, get_report, get_snapshot_summary, get_supplier_batch, list_supplier_batches,
};
