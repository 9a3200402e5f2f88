//! Core types and data structures for ledger classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four nested levels of the statutory reporting taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaxonomyLevel {
    /// Top level (e.g. "Expenses", "Non-Current Assets")
    MajorHead,
    /// Child of a Major Head
    MinorHead,
    /// Child of a Minor Head; the level ledgers are primarily mapped to
    Grouping,
    /// Optional child of a Grouping
    LineItem,
}

impl TaxonomyLevel {
    /// All levels, root first
    pub const ALL: [TaxonomyLevel; 4] = [
        TaxonomyLevel::MajorHead,
        TaxonomyLevel::MinorHead,
        TaxonomyLevel::Grouping,
        TaxonomyLevel::LineItem,
    ];

    /// The level a node of this level points at through `parent_code`
    pub fn parent(&self) -> Option<TaxonomyLevel> {
        match self {
            TaxonomyLevel::MajorHead => None,
            TaxonomyLevel::MinorHead => Some(TaxonomyLevel::MajorHead),
            TaxonomyLevel::Grouping => Some(TaxonomyLevel::MinorHead),
            TaxonomyLevel::LineItem => Some(TaxonomyLevel::Grouping),
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            TaxonomyLevel::MajorHead => 0,
            TaxonomyLevel::MinorHead => 1,
            TaxonomyLevel::Grouping => 2,
            TaxonomyLevel::LineItem => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonomyLevel::MajorHead => "major head",
            TaxonomyLevel::MinorHead => "minor head",
            TaxonomyLevel::Grouping => "grouping",
            TaxonomyLevel::LineItem => "line item",
        }
    }
}

impl fmt::Display for TaxonomyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single node of the reporting taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyNode {
    /// Code, unique within its level
    pub code: String,
    /// Display name used for matching
    pub name: String,
    /// Level of the node in the tree
    pub level: TaxonomyLevel,
    /// Code of the parent node; `None` only for Major Heads
    pub parent_code: Option<String>,
}

impl TaxonomyNode {
    /// Create a new node
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        level: TaxonomyLevel,
        parent_code: Option<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            level,
            parent_code,
        }
    }

    /// Create a Major Head node
    pub fn major_head(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(code, name, TaxonomyLevel::MajorHead, None)
    }

    /// Create a Minor Head node under the given Major Head
    pub fn minor_head(
        code: impl Into<String>,
        name: impl Into<String>,
        major_head_code: impl Into<String>,
    ) -> Self {
        Self::new(
            code,
            name,
            TaxonomyLevel::MinorHead,
            Some(major_head_code.into()),
        )
    }

    /// Create a Grouping node under the given Minor Head
    pub fn grouping(
        code: impl Into<String>,
        name: impl Into<String>,
        minor_head_code: impl Into<String>,
    ) -> Self {
        Self::new(
            code,
            name,
            TaxonomyLevel::Grouping,
            Some(minor_head_code.into()),
        )
    }

    /// Create a Line Item node under the given Grouping
    pub fn line_item(
        code: impl Into<String>,
        name: impl Into<String>,
        grouping_code: impl Into<String>,
    ) -> Self {
        Self::new(
            code,
            name,
            TaxonomyLevel::LineItem,
            Some(grouping_code.into()),
        )
    }
}

/// Broad accounting category detected from the wording of a name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// What the business owns (Cash, Inventory, Equipment, etc.)
    Asset,
    /// What the business owes (Loans, Payables, etc.)
    Liability,
    /// Money earned by the business
    Income,
    /// Costs incurred by the business
    Expense,
    /// Owner's interest in the business (Capital, Reserves, etc.)
    Equity,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Asset => "asset",
            Category::Liability => "liability",
            Category::Income => "income",
            Category::Expense => "expense",
            Category::Equity => "equity",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuggestionSource {
    /// External suggestion provider
    Ai,
    /// String-similarity cascade
    Fuzzy,
    /// Keyword-filtered fallback
    Keyword,
}

/// A complete placement of a ledger in the taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mapping {
    pub major_head_code: String,
    pub minor_head_code: String,
    pub grouping_code: String,
    pub line_item_code: Option<String>,
}

impl Mapping {
    pub fn new(
        major_head_code: impl Into<String>,
        minor_head_code: impl Into<String>,
        grouping_code: impl Into<String>,
        line_item_code: Option<String>,
    ) -> Self {
        Self {
            major_head_code: major_head_code.into(),
            minor_head_code: minor_head_code.into(),
            grouping_code: grouping_code.into(),
            line_item_code,
        }
    }
}

/// A proposed mapping for one ledger, produced per classification attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Proposed taxonomy placement
    #[serde(flatten)]
    pub mapping: Mapping,
    /// Trust in the mapping, in [0, 1]
    pub confidence: f64,
    /// Human-readable explanation
    pub rationale: String,
    /// Where the suggestion came from
    pub source: SuggestionSource,
}

impl Suggestion {
    pub fn new(
        mapping: Mapping,
        confidence: f64,
        rationale: impl Into<String>,
        source: SuggestionSource,
    ) -> Self {
        Self {
            mapping,
            confidence,
            rationale: rationale.into(),
            source,
        }
    }
}

/// Errors that can occur while configuring or feeding the classifier
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("Taxonomy error: {0}")]
    Taxonomy(String),
    #[error("Taxonomy parse error: {0}")]
    TaxonomyParse(#[from] serde_json::Error),
    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),
}

/// Result type for classifier operations
pub type ClassifierResult<T> = Result<T, ClassifierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parents() {
        assert_eq!(TaxonomyLevel::MajorHead.parent(), None);
        assert_eq!(
            TaxonomyLevel::LineItem.parent(),
            Some(TaxonomyLevel::Grouping)
        );
        for (i, level) in TaxonomyLevel::ALL.iter().enumerate() {
            assert_eq!(level.index(), i);
        }
    }

    #[test]
    fn test_suggestion_serializes_flat() {
        let suggestion = Suggestion::new(
            Mapping::new("MAJ1", "MIN1", "G1", None),
            0.7,
            "test",
            SuggestionSource::Fuzzy,
        );
        let json = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(json["grouping_code"], "G1");
        assert_eq!(json["source"], "Fuzzy");
    }
}
