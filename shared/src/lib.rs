//! Shared types and engine for the Replenishment Dashboard
//!
//! This crate contains the replenishment engine and the models it reads and
//! produces. It is shared between the backend service and the browser (via
//! WASM), so it performs no I/O.

pub mod error;
pub mod models;
pub mod replenishment;
pub mod snapshot;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use replenishment::*;
pub use snapshot::*;
pub use types::*;
pub use validation::*;
