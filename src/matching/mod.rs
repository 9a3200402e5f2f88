//! String-similarity and keyword heuristics used to match ledger names against taxonomy nodes

pub mod candidate;
pub mod keywords;
pub mod similarity;

pub use candidate::*;
pub use keywords::*;
pub use similarity::*;
