//! Request and response shapes for the external suggestion provider

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::taxonomy::Taxonomy;

/// Debit or credit nature of a closing balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceNature {
    Debit,
    Credit,
}

impl BalanceNature {
    /// Non-negative balances are treated as debit balances
    pub fn from_balance(balance: &BigDecimal) -> Self {
        if *balance >= BigDecimal::from(0) {
            BalanceNature::Debit
        } else {
            BalanceNature::Credit
        }
    }
}

/// Everything a provider is told about one ledger
#[derive(Debug, Clone, Copy)]
pub struct ProviderRequest<'a> {
    pub ledger_name: &'a str,
    pub closing_balance: &'a BigDecimal,
    pub balance_nature: BalanceNature,
    pub taxonomy: &'a Taxonomy,
}

impl<'a> ProviderRequest<'a> {
    pub fn new(ledger_name: &'a str, closing_balance: &'a BigDecimal, taxonomy: &'a Taxonomy) -> Self {
        Self {
            ledger_name,
            closing_balance,
            balance_nature: BalanceNature::from_balance(closing_balance),
            taxonomy,
        }
    }

    /// Free-text hint for providers about ambiguous ledgers
    ///
    /// Only advisory: nothing in the engine enforces it on the returned suggestion.
    pub fn advisory_note(&self) -> Option<String> {
        let name = self.ledger_name.to_lowercase();
        if !name.contains("commission") || name.contains("received") || name.contains("paid") {
            return None;
        }

        let note = match self.balance_nature {
            BalanceNature::Debit => {
                "Debit balance: a commission ledger with a debit balance is usually commission paid (an expense)"
            }
            BalanceNature::Credit => {
                "Credit balance: a commission ledger with a credit balance is usually commission received (income)"
            }
        };
        Some(note.to_string())
    }
}

/// Suggestion exactly as returned by an external provider; untrusted until validated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSuggestion {
    #[serde(default)]
    pub major_head_code: String,
    #[serde(default)]
    pub minor_head_code: String,
    #[serde(default)]
    pub grouping_code: String,
    /// Empty strings are treated as absent
    #[serde(default)]
    pub line_item_code: Option<String>,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

impl ExternalSuggestion {
    pub fn new(
        major_head_code: impl Into<String>,
        minor_head_code: impl Into<String>,
        grouping_code: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            major_head_code: major_head_code.into(),
            minor_head_code: minor_head_code.into(),
            grouping_code: grouping_code.into(),
            line_item_code: None,
            confidence,
            reasoning: String::new(),
        }
    }

    pub fn with_line_item(mut self, line_item_code: impl Into<String>) -> Self {
        self.line_item_code = Some(line_item_code.into());
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    /// Parse a provider's JSON response body
    pub fn from_json(body: &str) -> Result<Self, ProviderError> {
        serde_json::from_str(body).map_err(|e| ProviderError::MalformedResponse(e.to_string()))
    }
}

/// Failures of the external suggestion channel
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider unreachable: {0}")]
    Connectivity(String),
    #[error("Provider quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),
    #[error("Provider request failed: {0}")]
    Request(String),
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Whether the failure affects the whole channel rather than a single ledger
    pub fn is_systemic(&self) -> bool {
        matches!(
            self,
            ProviderError::Connectivity(_)
                | ProviderError::QuotaExceeded(_)
                | ProviderError::Unavailable(_)
        )
    }
}
