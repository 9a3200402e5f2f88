//! In-memory suggestion provider for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::provider::{ExternalSuggestion, ProviderError, ProviderRequest};
use crate::traits::*;

/// In-memory provider answering from a fixed table keyed by ledger name
///
/// Failures can be scripted per ledger or for the whole channel, which makes
/// it useful for exercising fallback paths without network access.
#[derive(Debug, Clone, Default)]
pub struct StaticSuggestionProvider {
    suggestions: Arc<RwLock<HashMap<String, ExternalSuggestion>>>,
    failures: Arc<RwLock<HashMap<String, ProviderError>>>,
    outage: Arc<RwLock<Option<ProviderError>>>,
    calls: Arc<AtomicUsize>,
}

impl StaticSuggestionProvider {
    /// Create an empty provider that never suggests anything
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `suggestion` whenever `ledger_name` is requested
    pub fn insert(&self, ledger_name: impl Into<String>, suggestion: ExternalSuggestion) {
        self.suggestions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ledger_name.into(), suggestion);
    }

    /// Fail requests for a single ledger
    pub fn fail_for(&self, ledger_name: impl Into<String>, error: ProviderError) {
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ledger_name.into(), error);
    }

    /// Fail every request, as during an outage or quota exhaustion
    pub fn fail_all(&self, error: ProviderError) {
        *self.outage.write().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Clear all suggestions and scripted failures (the call counter is kept)
    pub fn clear(&self) {
        self.suggestions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        *self.outage.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Number of `suggest` calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SuggestionProvider for StaticSuggestionProvider {
    async fn suggest(
        &self,
        request: &ProviderRequest<'_>,
    ) -> Result<Option<ExternalSuggestion>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self
            .outage
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }

        if let Some(error) = self
            .failures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(request.ledger_name)
            .cloned()
        {
            return Err(error);
        }

        Ok(self
            .suggestions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(request.ledger_name)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::Taxonomy;
    use bigdecimal::BigDecimal;

    #[tokio::test]
    async fn test_answers_and_failures() {
        let provider = StaticSuggestionProvider::new();
        provider.insert("Office Rent", ExternalSuggestion::new("MAJ1", "M1", "G1", 0.9));
        provider.fail_for("Bad Ledger", ProviderError::Request("rejected".into()));

        let taxonomy = Taxonomy::default();
        let balance = BigDecimal::from(100);

        let found = provider
            .suggest(&ProviderRequest::new("Office Rent", &balance, &taxonomy))
            .await
            .unwrap();
        assert_eq!(found.unwrap().grouping_code, "G1");

        let missing = provider
            .suggest(&ProviderRequest::new("Unknown", &balance, &taxonomy))
            .await
            .unwrap();
        assert!(missing.is_none());

        let failed = provider
            .suggest(&ProviderRequest::new("Bad Ledger", &balance, &taxonomy))
            .await;
        assert!(matches!(failed, Err(ProviderError::Request(_))));

        provider.fail_all(ProviderError::QuotaExceeded("daily limit".into()));
        let outage = provider
            .suggest(&ProviderRequest::new("Office Rent", &balance, &taxonomy))
            .await;
        assert!(matches!(outage, Err(ProviderError::QuotaExceeded(_))));
        assert_eq!(provider.call_count(), 4);

        provider.clear();
        let cleared = provider
            .suggest(&ProviderRequest::new("Office Rent", &balance, &taxonomy))
            .await
            .unwrap();
        assert!(cleared.is_none());
    }
}
