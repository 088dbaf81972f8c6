//! Replenishment core: need estimation, lot selection and report assembly

pub mod assembler;
pub mod demand;
pub mod engine;
pub mod lot_selector;
pub mod policy;

pub use assembler::*;
pub use demand::*;
pub use engine::*;
pub use lot_selector::*;
pub use policy::*;
