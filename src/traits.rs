//! Traits for the external provider boundary, validation and resolution strategies

use async_trait::async_trait;

use crate::provider::{ExternalSuggestion, ProviderError, ProviderRequest};
use crate::taxonomy::Taxonomy;
use crate::types::*;
use crate::utils::validation::{validate_external_suggestion, SuggestionRejection};

/// External source of mapping suggestions (an AI service, a remote rules engine, ...)
///
/// Implementations return `Ok(None)` when they have nothing to suggest and an
/// error when the call itself failed. Systemic errors (see
/// [`ProviderError::is_systemic`]) switch a running batch to local resolution.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Ask for a suggestion for a single ledger
    async fn suggest(
        &self,
        request: &ProviderRequest<'_>,
    ) -> Result<Option<ExternalSuggestion>, ProviderError>;
}

#[async_trait]
impl<P: SuggestionProvider + ?Sized> SuggestionProvider for Box<P> {
    async fn suggest(
        &self,
        request: &ProviderRequest<'_>,
    ) -> Result<Option<ExternalSuggestion>, ProviderError> {
        (**self).suggest(request).await
    }
}

/// Trait for checking untrusted suggestions against the taxonomy
pub trait SuggestionValidator: Send + Sync {
    /// Validate an external suggestion, producing a trusted `Ai` suggestion
    fn validate(
        &self,
        suggestion: &ExternalSuggestion,
        taxonomy: &Taxonomy,
    ) -> Result<Suggestion, SuggestionRejection>;
}

/// Default validator enforcing existence and parent/child consistency of every code
pub struct DefaultSuggestionValidator;

impl SuggestionValidator for DefaultSuggestionValidator {
    fn validate(
        &self,
        suggestion: &ExternalSuggestion,
        taxonomy: &Taxonomy,
    ) -> Result<Suggestion, SuggestionRejection> {
        validate_external_suggestion(suggestion, taxonomy)
    }
}

/// One step of the local resolution cascade
pub trait ResolutionStrategy: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Try to place a ledger; `None` hands over to the next strategy
    fn attempt(&self, ledger_name: &str, taxonomy: &Taxonomy) -> Option<Suggestion>;
}
