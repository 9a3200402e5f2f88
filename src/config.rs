//! Tunable thresholds and batch settings

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::*;

/// Thresholds used by the cascading resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Minimum raw similarity for a Grouping candidate
    pub grouping_threshold: f64,
    /// Minimum confidence to accept a Grouping match
    pub grouping_floor: f64,
    /// Minimum raw similarity for a Line Item under the accepted Grouping
    pub line_item_threshold: f64,
    /// Minimum raw similarity for a Minor Head candidate
    pub minor_head_threshold: f64,
    /// Minimum confidence to accept a Minor Head match
    pub minor_head_floor: f64,
    /// Minimum raw similarity when choosing a Grouping under a matched Minor Head
    pub minor_head_grouping_threshold: f64,
    /// Confidence scale for Minor Head matches
    pub minor_head_scale: f64,
    /// Minimum raw similarity in the keyword-filtered fallback
    pub keyword_threshold: f64,
    /// Confidence scale for keyword-filtered matches
    pub keyword_scale: f64,
    /// Bonus for sharing a keyword category with a candidate
    pub keyword_bonus: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            grouping_threshold: 0.50,
            grouping_floor: 0.60,
            line_item_threshold: 0.55,
            minor_head_threshold: 0.50,
            minor_head_floor: 0.55,
            minor_head_grouping_threshold: 0.50,
            minor_head_scale: 0.9,
            keyword_threshold: 0.40,
            keyword_scale: 0.8,
            keyword_bonus: 0.1,
        }
    }
}

/// Acceptance floors used when arbitrating between sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbitrationConfig {
    /// Minimum confidence to auto-accept a validated external suggestion
    pub ai_floor: f64,
    /// Minimum confidence to auto-accept a locally resolved suggestion
    pub fuzzy_floor: f64,
}

impl Default for ArbitrationConfig {
    fn default() -> Self {
        Self {
            ai_floor: 0.85,
            fuzzy_floor: 0.55,
        }
    }
}

/// Settings for batch orchestration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of external calls in flight at once
    pub max_concurrency: usize,
    /// Per-call timeout for the external provider, in milliseconds
    pub provider_timeout_ms: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            provider_timeout_ms: None,
        }
    }
}

impl BatchConfig {
    pub fn provider_timeout(&self) -> Option<Duration> {
        self.provider_timeout_ms.map(Duration::from_millis)
    }
}

/// Complete classifier configuration
///
/// ```
/// use ledger_classifier::ClassifierConfig;
///
/// let config = ClassifierConfig::from_toml_str(
///     "[arbitration]\nai_floor = 0.9\n\n[batch]\nmax_concurrency = 2\n",
/// )
/// .unwrap();
/// assert_eq!(config.arbitration.ai_floor, 0.9);
/// assert_eq!(config.arbitration.fuzzy_floor, 0.55);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub resolver: ResolverConfig,
    pub arbitration: ArbitrationConfig,
    pub batch: BatchConfig,
}

impl ClassifierConfig {
    /// Parse a TOML document; omitted keys keep their defaults
    pub fn from_toml_str(text: &str) -> ClassifierResult<Self> {
        let config: ClassifierConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every threshold and scale lies in [0, 1] and concurrency is positive
    pub fn validate(&self) -> ClassifierResult<()> {
        let r = &self.resolver;
        let a = &self.arbitration;
        let values = [
            ("resolver.grouping_threshold", r.grouping_threshold),
            ("resolver.grouping_floor", r.grouping_floor),
            ("resolver.line_item_threshold", r.line_item_threshold),
            ("resolver.minor_head_threshold", r.minor_head_threshold),
            ("resolver.minor_head_floor", r.minor_head_floor),
            (
                "resolver.minor_head_grouping_threshold",
                r.minor_head_grouping_threshold,
            ),
            ("resolver.minor_head_scale", r.minor_head_scale),
            ("resolver.keyword_threshold", r.keyword_threshold),
            ("resolver.keyword_scale", r.keyword_scale),
            ("resolver.keyword_bonus", r.keyword_bonus),
            ("arbitration.ai_floor", a.ai_floor),
            ("arbitration.fuzzy_floor", a.fuzzy_floor),
        ];

        for (key, value) in values {
            if !(0.0..=1.0).contains(&value) {
                return Err(ClassifierError::Config(format!(
                    "{} must be between 0 and 1, got {}",
                    key, value
                )));
            }
        }

        if self.batch.max_concurrency == 0 {
            return Err(ClassifierError::Config(
                "batch.max_concurrency must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClassifierConfig::default();
        assert_eq!(config.resolver.grouping_threshold, 0.50);
        assert_eq!(config.resolver.grouping_floor, 0.60);
        assert_eq!(config.resolver.minor_head_scale, 0.9);
        assert_eq!(config.resolver.keyword_threshold, 0.40);
        assert_eq!(config.resolver.keyword_scale, 0.8);
        assert_eq!(config.resolver.line_item_threshold, 0.55);
        assert_eq!(config.arbitration.ai_floor, 0.85);
        assert_eq!(config.arbitration.fuzzy_floor, 0.55);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ClassifierConfig::from_toml_str(
            r#"
            [resolver]
            keyword_threshold = 0.35

            [batch]
            provider_timeout_ms = 1500
            "#,
        )
        .unwrap();
        assert_eq!(config.resolver.keyword_threshold, 0.35);
        assert_eq!(config.resolver.grouping_floor, 0.60);
        assert_eq!(
            config.batch.provider_timeout(),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(config.batch.max_concurrency, 4);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let err = ClassifierConfig::from_toml_str("[arbitration]\nai_floor = 1.5\n").unwrap_err();
        assert!(matches!(err, ClassifierError::Config(_)));

        let err = ClassifierConfig::from_toml_str("[batch]\nmax_concurrency = 0\n").unwrap_err();
        assert!(matches!(err, ClassifierError::Config(_)));

        let err = ClassifierConfig::from_toml_str("[batch\n").unwrap_err();
        assert!(matches!(err, ClassifierError::ConfigParse(_)));
    }
}
