//! Caller-owned ledger records and their mapping state

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::taxonomy::Taxonomy;
use crate::types::*;
use crate::utils::validation::validate_mapping;

/// Whether a ledger has been placed in the taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MappingState {
    #[default]
    Unmapped,
    Mapped(Mapping),
}

/// A named trial-balance account awaiting (or holding) a classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub id: String,
    pub name: String,
    /// Closing balance for the current period; negative for credit balances
    pub balance_current_period: BigDecimal,
    pub mapping: MappingState,
}

impl LedgerRecord {
    /// Create a new, unmapped ledger
    pub fn new(id: impl Into<String>, name: impl Into<String>, balance_current_period: BigDecimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            balance_current_period,
            mapping: MappingState::Unmapped,
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.mapping, MappingState::Mapped(_))
    }

    /// Current mapping, if any
    pub fn mapping(&self) -> Option<&Mapping> {
        match &self.mapping {
            MappingState::Mapped(mapping) => Some(mapping),
            MappingState::Unmapped => None,
        }
    }

    /// Commit a suggestion's mapping after re-checking it against the taxonomy
    ///
    /// The record is left untouched if the mapping is inconsistent.
    pub fn commit(&mut self, suggestion: &Suggestion, taxonomy: &Taxonomy) -> ClassifierResult<()> {
        validate_mapping(&suggestion.mapping, taxonomy).map_err(|reason| {
            ClassifierError::InvalidMapping(format!("ledger '{}': {}", self.name, reason))
        })?;
        self.mapping = MappingState::Mapped(suggestion.mapping.clone());
        Ok(())
    }

    /// Return the ledger to the unmapped state
    pub fn clear_mapping(&mut self) {
        self.mapping = MappingState::Unmapped;
    }

    /// Check that a stored mapping is still consistent with the taxonomy
    pub fn validate(&self, taxonomy: &Taxonomy) -> ClassifierResult<()> {
        match &self.mapping {
            MappingState::Unmapped => Ok(()),
            MappingState::Mapped(mapping) => validate_mapping(mapping, taxonomy)
                .map_err(|reason| ClassifierError::InvalidMapping(format!("ledger '{}': {}", self.name, reason))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> Taxonomy {
        Taxonomy::new(
            vec![
                TaxonomyNode::major_head("MAJ1", "Expenses"),
                TaxonomyNode::major_head("MAJ2", "Income"),
            ],
            vec![
                TaxonomyNode::minor_head("M1", "Other Expenses", "MAJ1"),
                TaxonomyNode::minor_head("M2", "Other Income", "MAJ2"),
            ],
            vec![TaxonomyNode::grouping("G1", "Rent Expense", "M1")],
            vec![TaxonomyNode::line_item("L1", "Office Rent", "G1")],
        )
        .unwrap()
    }

    #[test]
    fn test_commit_and_clear() {
        let taxonomy = taxonomy();
        let mut ledger = LedgerRecord::new("1", "Office Rent", BigDecimal::from(120000));
        assert!(!ledger.is_mapped());
        assert!(ledger.validate(&taxonomy).is_ok());

        let suggestion = Suggestion::new(
            Mapping::new("MAJ1", "M1", "G1", Some("L1".to_string())),
            0.9,
            "matched",
            SuggestionSource::Fuzzy,
        );
        ledger.commit(&suggestion, &taxonomy).unwrap();
        assert!(ledger.is_mapped());
        assert_eq!(ledger.mapping().unwrap().line_item_code.as_deref(), Some("L1"));
        assert!(ledger.validate(&taxonomy).is_ok());

        ledger.clear_mapping();
        assert_eq!(ledger.mapping, MappingState::Unmapped);
    }

    #[test]
    fn test_commit_rejects_inconsistent_mapping() {
        let taxonomy = taxonomy();
        let mut ledger = LedgerRecord::new("1", "Office Rent", BigDecimal::from(120000));
        let suggestion = Suggestion::new(
            Mapping::new("MAJ2", "M1", "G1", None),
            0.99,
            "wrong major head",
            SuggestionSource::Ai,
        );
        let err = ledger.commit(&suggestion, &taxonomy).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidMapping(_)));
        assert!(!ledger.is_mapped());
    }

    #[test]
    fn test_stale_mapping_detected() {
        let mut ledger = LedgerRecord::new("1", "Office Rent", BigDecimal::from(1));
        ledger.mapping = MappingState::Mapped(Mapping::new("MAJ1", "M1", "G404", None));
        assert!(ledger.validate(&taxonomy()).is_err());
    }
}
