//! # Ledger Classifier
//!
//! Classifies free-text trial-balance ledger names into a four-level statutory
//! reporting taxonomy (Major Head, Minor Head, Grouping, Line Item).
//!
//! ## Features
//!
//! - **Similarity scoring**: normalized Levenshtein similarity between names
//! - **Keyword hints**: asset/liability/income/expense/equity tags from wording
//! - **Cascading resolution**: grouping-first, minor-head and keyword-filtered fallbacks
//! - **Untrusted suggestions**: structural validation of externally supplied mappings
//! - **Arbitration**: source-specific confidence floors, no blending across sources
//! - **Batch orchestration**: bounded-concurrency provider calls with local fallback
//!
//! ## Quick Start
//!
//! ```rust
//! use ledger_classifier::{CascadingResolver, Taxonomy, TaxonomyNode};
//!
//! let taxonomy = Taxonomy::new(
//!     vec![TaxonomyNode::major_head("MAJ1", "Expenses")],
//!     vec![TaxonomyNode::minor_head("M1", "Other Expenses", "MAJ1")],
//!     vec![TaxonomyNode::grouping("G1", "Rent Expense", "M1")],
//!     vec![],
//! )
//! .unwrap();
//!
//! let suggestion = CascadingResolver::default()
//!     .resolve("Rent - Office Premises", &taxonomy)
//!     .unwrap();
//! assert_eq!(suggestion.mapping.grouping_code, "G1");
//! ```

pub mod classify;
pub mod config;
pub mod matching;
pub mod provider;
pub mod records;
pub mod taxonomy;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use classify::*;
pub use config::*;
pub use matching::*;
pub use provider::*;
pub use records::*;
pub use taxonomy::*;
pub use traits::*;
pub use types::*;
pub use utils::validation::{validate_external_suggestion, validate_mapping, SuggestionRejection};
pub use utils::StaticSuggestionProvider;
