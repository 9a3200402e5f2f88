//! Classification pipeline: local resolution cascade, arbitration and batch orchestration

pub mod arbitration;
pub mod batch;
pub mod resolver;

pub use arbitration::*;
pub use batch::*;
pub use resolver::*;
