//! Domain models for the replenishment engine

mod offer;
mod overlay;
mod product;
mod purchase_order;
mod recommendation;
mod sales;

pub use offer::*;
pub use overlay::*;
pub use product::*;
pub use purchase_order::*;
pub use recommendation::*;
pub use sales::*;
