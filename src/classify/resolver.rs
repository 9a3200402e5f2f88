//! Local resolution cascade: grouping-first, minor-head fallback, keyword fallback

use tracing::{debug, warn};

use crate::config::ResolverConfig;
use crate::matching::{describe, keywords_of, shares_category, CandidateMatcher};
use crate::taxonomy::Taxonomy;
use crate::traits::ResolutionStrategy;
use crate::types::*;

fn percent(score: f64) -> f64 {
    (score * 100.0).round()
}

/// Match directly against every Grouping, then try the Grouping's Line Items
#[derive(Debug, Clone)]
pub struct GroupingFirst {
    matcher: CandidateMatcher,
    threshold: f64,
    floor: f64,
    line_item_threshold: f64,
}

impl GroupingFirst {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            matcher: CandidateMatcher::new(config.keyword_bonus),
            threshold: config.grouping_threshold,
            floor: config.grouping_floor,
            line_item_threshold: config.line_item_threshold,
        }
    }
}

impl ResolutionStrategy for GroupingFirst {
    fn name(&self) -> &'static str {
        "grouping-first"
    }

    fn attempt(&self, ledger_name: &str, taxonomy: &Taxonomy) -> Option<Suggestion> {
        let found = self.matcher.best_match(
            ledger_name,
            taxonomy.nodes(TaxonomyLevel::Grouping),
            self.threshold,
        )?;
        if found.confidence < self.floor {
            return None;
        }

        let grouping = found.node;
        let (minor_head, major_head) = taxonomy.ancestry(grouping)?;

        let line_item = self.matcher.best_match(
            ledger_name,
            taxonomy.children_of(grouping),
            self.line_item_threshold,
        );
        if let Some(item) = &line_item {
            debug!(ledger = ledger_name, line_item = %item.node.code, "attached line item");
        }

        let mut rationale = format!(
            "Fuzzy matched to \"{}\" with {:.0}% similarity",
            grouping.name,
            percent(found.raw_score)
        );
        if let Some(item) = &line_item {
            rationale.push_str(&format!(" and line item \"{}\"", item.node.name));
        }

        Some(Suggestion::new(
            Mapping::new(
                &major_head.code,
                &minor_head.code,
                &grouping.code,
                line_item.map(|item| item.node.code.clone()),
            ),
            found.confidence,
            rationale,
            SuggestionSource::Fuzzy,
        ))
    }
}

/// Match against Minor Heads, then pick a Grouping beneath the matched one
#[derive(Debug, Clone)]
pub struct MinorHeadFallback {
    matcher: CandidateMatcher,
    threshold: f64,
    floor: f64,
    grouping_threshold: f64,
    scale: f64,
}

impl MinorHeadFallback {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            matcher: CandidateMatcher::new(config.keyword_bonus),
            threshold: config.minor_head_threshold,
            floor: config.minor_head_floor,
            grouping_threshold: config.minor_head_grouping_threshold,
            scale: config.minor_head_scale,
        }
    }
}

impl ResolutionStrategy for MinorHeadFallback {
    fn name(&self) -> &'static str {
        "minor-head"
    }

    fn attempt(&self, ledger_name: &str, taxonomy: &Taxonomy) -> Option<Suggestion> {
        let found = self.matcher.best_match(
            ledger_name,
            taxonomy.nodes(TaxonomyLevel::MinorHead),
            self.threshold,
        )?;
        if found.confidence < self.floor {
            return None;
        }

        let minor_head = found.node;
        let Some(major_head) = taxonomy.parent_of(minor_head) else {
            warn!(
                minor_head = %minor_head.code,
                parent = ?minor_head.parent_code,
                "minor head points at a missing major head; discarding match"
            );
            return None;
        };

        let groupings = taxonomy.children_of(minor_head);
        let grouping = match self
            .matcher
            .best_match(ledger_name, groupings.iter().copied(), self.grouping_threshold)
        {
            Some(best) => best.node,
            None => *groupings.first()?,
        };

        Some(Suggestion::new(
            Mapping::new(&major_head.code, &minor_head.code, &grouping.code, None),
            found.confidence * self.scale,
            format!(
                "Fuzzy matched to minor head \"{}\" with {:.0}% similarity",
                minor_head.name,
                percent(found.raw_score)
            ),
            SuggestionSource::Fuzzy,
        ))
    }
}

/// Match against Groupings sharing a keyword category with the ledger, at a lower threshold
#[derive(Debug, Clone)]
pub struct KeywordFallback {
    matcher: CandidateMatcher,
    threshold: f64,
    scale: f64,
}

impl KeywordFallback {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            matcher: CandidateMatcher::new(config.keyword_bonus),
            threshold: config.keyword_threshold,
            scale: config.keyword_scale,
        }
    }
}

impl ResolutionStrategy for KeywordFallback {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn attempt(&self, ledger_name: &str, taxonomy: &Taxonomy) -> Option<Suggestion> {
        let tags = keywords_of(ledger_name);
        if tags.is_empty() {
            return None;
        }

        let candidates = taxonomy
            .nodes(TaxonomyLevel::Grouping)
            .iter()
            .filter(|grouping| shares_category(&tags, &keywords_of(&grouping.name)));
        let found = self
            .matcher
            .best_match(ledger_name, candidates, self.threshold)?;

        let grouping = found.node;
        let (minor_head, major_head) = taxonomy.ancestry(grouping)?;

        Some(Suggestion::new(
            Mapping::new(&major_head.code, &minor_head.code, &grouping.code, None),
            found.confidence * self.scale,
            format!(
                "Keyword-based match to \"{}\" (detected: {})",
                grouping.name,
                describe(&tags)
            ),
            SuggestionSource::Keyword,
        ))
    }
}

/// Ordered list of strategies tried until one produces a suggestion
pub struct CascadingResolver {
    strategies: Vec<Box<dyn ResolutionStrategy>>,
}

impl Default for CascadingResolver {
    fn default() -> Self {
        Self::new(&ResolverConfig::default())
    }
}

impl CascadingResolver {
    /// The standard three-step cascade
    pub fn new(config: &ResolverConfig) -> Self {
        Self::with_strategies(vec![
            Box::new(GroupingFirst::new(config)),
            Box::new(MinorHeadFallback::new(config)),
            Box::new(KeywordFallback::new(config)),
        ])
    }

    /// A cascade with a custom strategy order
    pub fn with_strategies(strategies: Vec<Box<dyn ResolutionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Append a strategy tried after all existing ones
    pub fn push_strategy(&mut self, strategy: Box<dyn ResolutionStrategy>) {
        self.strategies.push(strategy);
    }

    /// Names of the strategies, in the order they are tried
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolve a ledger name locally; `None` means it needs manual classification
    pub fn resolve(&self, ledger_name: &str, taxonomy: &Taxonomy) -> Option<Suggestion> {
        for strategy in &self.strategies {
            if let Some(suggestion) = strategy.attempt(ledger_name, taxonomy) {
                debug!(
                    ledger = ledger_name,
                    strategy = strategy.name(),
                    grouping = %suggestion.mapping.grouping_code,
                    confidence = suggestion.confidence,
                    "resolved locally"
                );
                return Some(suggestion);
            }
        }
        debug!(ledger = ledger_name, "no local match");
        None
    }
}
