//! Best-candidate selection among taxonomy nodes of a single level

use crate::matching::keywords::{keywords_of, shares_category};
use crate::matching::similarity::similarity;
use crate::types::TaxonomyNode;

/// Bonus added to a candidate's confidence when it shares a keyword category with the ledger
pub const DEFAULT_KEYWORD_BONUS: f64 = 0.1;

/// A candidate node that cleared the similarity threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateMatch<'a> {
    pub node: &'a TaxonomyNode,
    /// Plain string similarity between the ledger and node names
    pub raw_score: f64,
    /// Raw score plus any keyword bonus, capped at 1.0
    pub confidence: f64,
}

/// Scores ledger names against candidate nodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateMatcher {
    keyword_bonus: f64,
}

impl Default for CandidateMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORD_BONUS)
    }
}

impl CandidateMatcher {
    pub fn new(keyword_bonus: f64) -> Self {
        Self { keyword_bonus }
    }

    /// Pick the candidate with the highest confidence among those whose raw
    /// similarity meets `threshold`
    ///
    /// The keyword bonus never makes a candidate eligible on its own. Ties keep
    /// the first candidate in input order.
    pub fn best_match<'a, I>(&self, name: &str, candidates: I, threshold: f64) -> Option<CandidateMatch<'a>>
    where
        I: IntoIterator<Item = &'a TaxonomyNode>,
    {
        let ledger_tags = keywords_of(name);
        let mut best: Option<CandidateMatch<'a>> = None;

        for node in candidates {
            let raw_score = similarity(name, &node.name);
            if raw_score < threshold {
                continue;
            }

            let bonus = if !ledger_tags.is_empty() && shares_category(&ledger_tags, &keywords_of(&node.name)) {
                self.keyword_bonus
            } else {
                0.0
            };
            let confidence = (raw_score + bonus).min(1.0);

            if best.is_none_or(|current| confidence > current.confidence) {
                best = Some(CandidateMatch {
                    node,
                    raw_score,
                    confidence,
                });
            }
        }

        best
    }
}

/// Best match using the default keyword bonus
pub fn best_match<'a, I>(name: &str, candidates: I, threshold: f64) -> Option<CandidateMatch<'a>>
where
    I: IntoIterator<Item = &'a TaxonomyNode>,
{
    CandidateMatcher::default().best_match(name, candidates, threshold)
}
