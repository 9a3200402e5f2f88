//! Batch orchestration over many ledgers with graceful degradation

use chrono::{NaiveDateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::classify::arbitration::ArbitrationPolicy;
use crate::classify::resolver::CascadingResolver;
use crate::config::ClassifierConfig;
use crate::provider::{ExternalSuggestion, ProviderError, ProviderRequest};
use crate::records::LedgerRecord;
use crate::taxonomy::Taxonomy;
use crate::traits::*;
use crate::types::*;

/// Which sources a batch may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOptions {
    /// Ask the external provider for every ledger
    pub use_external: bool,
    /// Run the local cascade when the external source does not settle a ledger
    pub use_fuzzy_fallback: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            use_external: true,
            use_fuzzy_fallback: true,
        }
    }
}

impl BatchOptions {
    pub fn local_only() -> Self {
        Self {
            use_external: false,
            use_fuzzy_fallback: true,
        }
    }
}

/// How the external channel behaved over a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelMode {
    /// The external provider was not used
    LocalOnly,
    /// The external provider stayed available for the whole batch
    External,
    /// The channel failed and the remaining ledgers were resolved locally
    LocalFallback { reason: String },
    /// The channel failed with no local fallback; remaining ledgers are unmapped
    Degraded { reason: String },
}

/// Classification result for one input ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub ledger_id: String,
    pub ledger_name: String,
    pub suggestion: Option<Suggestion>,
}

/// Outcome tallies; `ai_mapped + fuzzy_mapped + keyword_mapped + unmapped` equals the batch size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCounts {
    pub ai_mapped: usize,
    pub fuzzy_mapped: usize,
    pub keyword_mapped: usize,
    pub unmapped: usize,
    /// External suggestions discarded by validation (diagnostic, not part of the total)
    pub rejected_external: usize,
}

impl BatchCounts {
    fn record(&mut self, suggestion: Option<&Suggestion>) {
        match suggestion.map(|s| s.source) {
            Some(SuggestionSource::Ai) => self.ai_mapped += 1,
            Some(SuggestionSource::Fuzzy) => self.fuzzy_mapped += 1,
            Some(SuggestionSource::Keyword) => self.keyword_mapped += 1,
            None => self.unmapped += 1,
        }
    }

    /// Ledgers mapped by the local cascade, whichever strategy fired
    pub fn local_mapped(&self) -> usize {
        self.fuzzy_mapped + self.keyword_mapped
    }

    /// Number of ledgers accounted for
    pub fn total(&self) -> usize {
        self.ai_mapped + self.local_mapped() + self.unmapped
    }
}

/// Structured summary of one batch invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub started_at: NaiveDateTime,
    pub finished_at: NaiveDateTime,
    pub mode: ChannelMode,
    /// One entry per input ledger, in input order
    pub outcomes: Vec<BatchOutcome>,
    pub counts: BatchCounts,
}

enum ExternalAttempt {
    Skipped,
    Answered(Option<ExternalSuggestion>),
    Failed(ProviderError),
}

/// Drives classification of many ledgers through the provider, arbitration and local cascade
pub struct BatchClassifier<P: SuggestionProvider> {
    provider: P,
    resolver: CascadingResolver,
    policy: ArbitrationPolicy,
    config: ClassifierConfig,
}

impl<P: SuggestionProvider> BatchClassifier<P> {
    /// Create a classifier with the standard cascade and policy built from `config`
    pub fn new(provider: P, config: ClassifierConfig) -> ClassifierResult<Self> {
        config.validate()?;
        Ok(Self {
            provider,
            resolver: CascadingResolver::new(&config.resolver),
            policy: ArbitrationPolicy::new(config.arbitration.clone()),
            config,
        })
    }

    /// Create a classifier with a custom cascade and policy
    pub fn with_parts(
        provider: P,
        resolver: CascadingResolver,
        policy: ArbitrationPolicy,
        config: ClassifierConfig,
    ) -> ClassifierResult<Self> {
        config.validate()?;
        Ok(Self {
            provider,
            resolver,
            policy,
            config,
        })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn resolver(&self) -> &CascadingResolver {
        &self.resolver
    }

    /// Per-call timeout, dropped with a warning when no Tokio runtime is driving the batch
    fn provider_timeout(&self) -> Option<Duration> {
        let limit = self.config.batch.provider_timeout()?;
        if tokio::runtime::Handle::try_current().is_err() {
            warn!(
                timeout_ms = limit.as_millis() as u64,
                "no Tokio runtime available; provider calls run without a timeout"
            );
            return None;
        }
        Some(limit)
    }

    /// Ask the provider about one ledger
    ///
    /// `failed_at` holds the input index of the earliest systemic failure seen
    /// so far; ledgers after it are not sent to the provider.
    async fn attempt_external(
        &self,
        index: usize,
        ledger: &LedgerRecord,
        taxonomy: &Taxonomy,
        use_external: bool,
        timeout: Option<Duration>,
        failed_at: &AtomicUsize,
    ) -> ExternalAttempt {
        if !use_external || index > failed_at.load(Ordering::Acquire) {
            return ExternalAttempt::Skipped;
        }

        let request = ProviderRequest::new(&ledger.name, &ledger.balance_current_period, taxonomy);
        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, self.provider.suggest(&request))
                .await
                .unwrap_or(Err(ProviderError::Timeout(limit))),
            None => self.provider.suggest(&request).await,
        };

        match result {
            Ok(answer) => ExternalAttempt::Answered(answer),
            Err(error) => {
                if error.is_systemic() {
                    failed_at.fetch_min(index, Ordering::AcqRel);
                }
                ExternalAttempt::Failed(error)
            }
        }
    }

    fn settle(
        &self,
        ledger: &LedgerRecord,
        external: Option<&ExternalSuggestion>,
        taxonomy: &Taxonomy,
        use_fuzzy_fallback: bool,
        counts: &mut BatchCounts,
    ) -> BatchOutcome {
        let decision = self.policy.decide_with(&ledger.name, external, taxonomy, || {
            if use_fuzzy_fallback {
                self.resolver.resolve(&ledger.name, taxonomy)
            } else {
                None
            }
        });

        if decision.was_rejected() {
            counts.rejected_external += 1;
        }
        counts.record(decision.applied.as_ref());

        BatchOutcome {
            ledger_id: ledger.id.clone(),
            ledger_name: ledger.name.clone(),
            suggestion: decision.applied,
        }
    }

    /// Classify every ledger, returning outcomes in input order
    ///
    /// External calls run with bounded concurrency. `on_progress(completed, total)`
    /// is called once per ledger, in order, after its outcome is settled.
    /// Provider failures never abort the batch: per-ledger failures count as
    /// "no suggestion". A systemic failure stops further calls, and the failing
    /// ledger and every ledger after it in input order are settled without the
    /// provider's answers, even for calls that were already in flight.
    ///
    /// `provider_timeout_ms` needs a Tokio runtime with the time driver; under
    /// any other executor the timeout is skipped with a warning.
    pub async fn classify_batch<F>(
        &self,
        ledgers: &[LedgerRecord],
        taxonomy: &Taxonomy,
        options: BatchOptions,
        mut on_progress: F,
    ) -> BatchReport
    where
        F: FnMut(usize, usize),
    {
        let batch_id = Uuid::new_v4();
        let started_at = Utc::now().naive_utc();
        let total = ledgers.len();
        let failed_at = AtomicUsize::new(usize::MAX);
        let timeout = if options.use_external {
            self.provider_timeout()
        } else {
            None
        };
        let mut channel_failure: Option<String> = None;
        let mut counts = BatchCounts::default();
        let mut outcomes = Vec::with_capacity(total);

        let attempts = stream::iter(ledgers.iter().enumerate())
            .map(|(index, ledger)| {
                let failed_at = &failed_at;
                async move {
                    let attempt = self
                        .attempt_external(
                            index,
                            ledger,
                            taxonomy,
                            options.use_external,
                            timeout,
                            failed_at,
                        )
                        .await;
                    (ledger, attempt)
                }
            })
            .buffered(self.config.batch.max_concurrency.max(1));
        let mut attempts = std::pin::pin!(attempts);

        while let Some((ledger, attempt)) = attempts.next().await {
            let external = match attempt {
                // the channel is down: answers from calls still in flight are ignored
                _ if channel_failure.is_some() => None,
                ExternalAttempt::Skipped => None,
                ExternalAttempt::Answered(answer) => answer,
                ExternalAttempt::Failed(error) if error.is_systemic() => {
                    warn!(
                        %batch_id,
                        ledger = %ledger.name,
                        %error,
                        fallback = options.use_fuzzy_fallback,
                        "external channel failed; switching remaining ledgers to local resolution"
                    );
                    channel_failure = Some(error.to_string());
                    None
                }
                ExternalAttempt::Failed(error) => {
                    warn!(%batch_id, ledger = %ledger.name, %error, "external suggestion failed");
                    None
                }
            };

            outcomes.push(self.settle(
                ledger,
                external.as_ref(),
                taxonomy,
                options.use_fuzzy_fallback,
                &mut counts,
            ));
            on_progress(outcomes.len(), total);
        }

        let mode = match (options.use_external, channel_failure) {
            (false, _) => ChannelMode::LocalOnly,
            (true, None) => ChannelMode::External,
            (true, Some(reason)) if options.use_fuzzy_fallback => ChannelMode::LocalFallback { reason },
            (true, Some(reason)) => ChannelMode::Degraded { reason },
        };

        info!(
            %batch_id,
            total,
            ai = counts.ai_mapped,
            fuzzy = counts.fuzzy_mapped,
            keyword = counts.keyword_mapped,
            unmapped = counts.unmapped,
            rejected = counts.rejected_external,
            ?mode,
            "batch classified"
        );

        BatchReport {
            batch_id,
            started_at,
            finished_at: Utc::now().naive_utc(),
            mode,
            outcomes,
            counts,
        }
    }

    /// Classify a single ledger with the same policy as a batch
    pub async fn classify_one(
        &self,
        ledger: &LedgerRecord,
        taxonomy: &Taxonomy,
        options: BatchOptions,
    ) -> Option<Suggestion> {
        let failed_at = AtomicUsize::new(usize::MAX);
        let timeout = if options.use_external {
            self.provider_timeout()
        } else {
            None
        };
        let external = match self
            .attempt_external(0, ledger, taxonomy, options.use_external, timeout, &failed_at)
            .await
        {
            ExternalAttempt::Answered(answer) => answer,
            ExternalAttempt::Failed(error) => {
                warn!(ledger = %ledger.name, %error, "external suggestion failed");
                None
            }
            ExternalAttempt::Skipped => None,
        };

        let mut counts = BatchCounts::default();
        self.settle(
            ledger,
            external.as_ref(),
            taxonomy,
            options.use_fuzzy_fallback,
            &mut counts,
        )
        .suggestion
    }
}
