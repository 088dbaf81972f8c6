//! Business logic services for the Replenishment Dashboard

pub mod export;
pub mod replenishment;

pub use export::ExportService;
pub use replenishment::ReplenishmentService;
