//! Structural validation of mappings and untrusted suggestions

use crate::provider::ExternalSuggestion;
use crate::taxonomy::Taxonomy;
use crate::types::*;

/// Why a suggestion or mapping cannot be trusted
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SuggestionRejection {
    #[error("Missing {0} code")]
    MissingField(TaxonomyLevel),
    #[error("Unknown {level} code '{code}'")]
    UnknownCode { level: TaxonomyLevel, code: String },
    #[error("{level} '{code}' belongs to '{actual_parent}', not '{claimed_parent}'")]
    ParentMismatch {
        level: TaxonomyLevel,
        code: String,
        claimed_parent: String,
        actual_parent: String,
    },
    #[error("Confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f64),
}

/// Validate that a confidence score is a number in [0, 1]
pub fn validate_confidence(confidence: f64) -> Result<(), SuggestionRejection> {
    if (0.0..=1.0).contains(&confidence) {
        Ok(())
    } else {
        Err(SuggestionRejection::ConfidenceOutOfRange(confidence))
    }
}

fn required_code(code: &str, level: TaxonomyLevel) -> Result<&str, SuggestionRejection> {
    let code = code.trim();
    if code.is_empty() {
        Err(SuggestionRejection::MissingField(level))
    } else {
        Ok(code)
    }
}

fn existing<'a>(
    taxonomy: &'a Taxonomy,
    level: TaxonomyLevel,
    code: &str,
) -> Result<&'a TaxonomyNode, SuggestionRejection> {
    taxonomy
        .node(level, code)
        .ok_or_else(|| SuggestionRejection::UnknownCode {
            level,
            code: code.to_string(),
        })
}

fn check_parent(node: &TaxonomyNode, claimed_parent: &str) -> Result<(), SuggestionRejection> {
    let actual_parent = node.parent_code.as_deref().unwrap_or_default();
    if actual_parent == claimed_parent {
        Ok(())
    } else {
        Err(SuggestionRejection::ParentMismatch {
            level: node.level,
            code: node.code.clone(),
            claimed_parent: claimed_parent.to_string(),
            actual_parent: actual_parent.to_string(),
        })
    }
}

/// Validate that every code in a mapping exists at its level and the chain is consistent
pub fn validate_mapping(mapping: &Mapping, taxonomy: &Taxonomy) -> Result<(), SuggestionRejection> {
    let major_code = required_code(&mapping.major_head_code, TaxonomyLevel::MajorHead)?;
    let minor_code = required_code(&mapping.minor_head_code, TaxonomyLevel::MinorHead)?;
    let grouping_code = required_code(&mapping.grouping_code, TaxonomyLevel::Grouping)?;

    existing(taxonomy, TaxonomyLevel::MajorHead, major_code)?;
    let minor_head = existing(taxonomy, TaxonomyLevel::MinorHead, minor_code)?;
    check_parent(minor_head, major_code)?;
    let grouping = existing(taxonomy, TaxonomyLevel::Grouping, grouping_code)?;
    check_parent(grouping, minor_code)?;

    if let Some(line_item_code) = mapping.line_item_code.as_deref() {
        let line_item = existing(taxonomy, TaxonomyLevel::LineItem, line_item_code)?;
        check_parent(line_item, grouping_code)?;
    }

    Ok(())
}

/// Validate an external suggestion and convert it into a trusted `Ai` suggestion
///
/// Codes are trimmed and an empty line item code counts as absent.
pub fn validate_external_suggestion(
    suggestion: &ExternalSuggestion,
    taxonomy: &Taxonomy,
) -> Result<Suggestion, SuggestionRejection> {
    validate_confidence(suggestion.confidence)?;

    let line_item_code = suggestion
        .line_item_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string);

    let mapping = Mapping::new(
        suggestion.major_head_code.trim(),
        suggestion.minor_head_code.trim(),
        suggestion.grouping_code.trim(),
        line_item_code,
    );
    validate_mapping(&mapping, taxonomy)?;

    let rationale = if suggestion.reasoning.trim().is_empty() {
        "Suggested by external provider".to_string()
    } else {
        suggestion.reasoning.trim().to_string()
    };

    Ok(Suggestion::new(
        mapping,
        suggestion.confidence,
        rationale,
        SuggestionSource::Ai,
    ))
}
