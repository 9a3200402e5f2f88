//! Utility modules

pub mod memory_provider;
pub mod validation;

pub use memory_provider::*;
pub use validation::*;
