//! Decides between external and locally resolved suggestions for one ledger

use tracing::{debug, warn};

use crate::config::ArbitrationConfig;
use crate::provider::ExternalSuggestion;
use crate::taxonomy::Taxonomy;
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::SuggestionRejection;

/// How an external suggestion fared
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalVerdict {
    /// Valid and confident enough to apply
    Accepted(Suggestion),
    /// Valid but under the acceptance floor
    BelowFloor(Suggestion),
    /// Structurally invalid; treated as if no suggestion was given
    Rejected(SuggestionRejection),
}

/// Result of arbitrating one ledger
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decision {
    /// Suggestion to apply, if any source cleared its bar
    pub applied: Option<Suggestion>,
    /// Verdict on the external suggestion, when one was supplied
    pub external: Option<ExternalVerdict>,
}

impl Decision {
    pub fn was_rejected(&self) -> bool {
        matches!(self.external, Some(ExternalVerdict::Rejected(_)))
    }
}

/// Source-specific acceptance floors with no blending across sources
pub struct ArbitrationPolicy {
    config: ArbitrationConfig,
    validator: Box<dyn SuggestionValidator>,
}

impl Default for ArbitrationPolicy {
    fn default() -> Self {
        Self::new(ArbitrationConfig::default())
    }
}

impl ArbitrationPolicy {
    /// Create a policy with the structural validator
    pub fn new(config: ArbitrationConfig) -> Self {
        Self::with_validator(config, Box::new(DefaultSuggestionValidator))
    }

    /// Create a policy with a custom validator
    pub fn with_validator(config: ArbitrationConfig, validator: Box<dyn SuggestionValidator>) -> Self {
        Self { config, validator }
    }

    pub fn config(&self) -> &ArbitrationConfig {
        &self.config
    }

    /// Validate an external suggestion and compare it against the Ai floor
    pub fn judge_external(
        &self,
        ledger_name: &str,
        suggestion: &ExternalSuggestion,
        taxonomy: &Taxonomy,
    ) -> ExternalVerdict {
        match self.validator.validate(suggestion, taxonomy) {
            Ok(valid) if valid.confidence >= self.config.ai_floor => ExternalVerdict::Accepted(valid),
            Ok(valid) => {
                debug!(
                    ledger = ledger_name,
                    confidence = valid.confidence,
                    floor = self.config.ai_floor,
                    "external suggestion below acceptance floor"
                );
                ExternalVerdict::BelowFloor(valid)
            }
            Err(reason) => {
                warn!(ledger = ledger_name, %reason, "rejected external suggestion");
                ExternalVerdict::Rejected(reason)
            }
        }
    }

    /// Accept a local suggestion if it clears the Fuzzy floor
    pub fn accept_local(&self, suggestion: Option<Suggestion>) -> Option<Suggestion> {
        suggestion.filter(|s| s.confidence >= self.config.fuzzy_floor)
    }

    /// Arbitrate with an already computed local suggestion
    pub fn decide(
        &self,
        ledger_name: &str,
        external: Option<&ExternalSuggestion>,
        local: Option<&Suggestion>,
        taxonomy: &Taxonomy,
    ) -> Decision {
        self.decide_with(ledger_name, external, taxonomy, || local.cloned())
    }

    /// Arbitrate, computing the local suggestion only if the external one does not win
    pub fn decide_with<F>(
        &self,
        ledger_name: &str,
        external: Option<&ExternalSuggestion>,
        taxonomy: &Taxonomy,
        local: F,
    ) -> Decision
    where
        F: FnOnce() -> Option<Suggestion>,
    {
        let verdict = external.map(|s| self.judge_external(ledger_name, s, taxonomy));

        if let Some(ExternalVerdict::Accepted(suggestion)) = &verdict {
            return Decision {
                applied: Some(suggestion.clone()),
                external: verdict,
            };
        }

        Decision {
            applied: self.accept_local(local()),
            external: verdict,
        }
    }
}
