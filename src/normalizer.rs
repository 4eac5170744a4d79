use crate::error::ClassifyError;
use crate::types::{AnalysisResult, RawVerdict, SafetyCategory};

use std::collections::BTreeSet;
use tracing::warn;

/// Reasoning attached to the verdict produced when classification fails
pub const FAILURE_REASONING: &str = "classification failed";

/// Substring markers for each flagged category, in precedence order.
/// The first entry whose marker occurs in a label decides the category.
const CATEGORY_MARKERS: &[(&[&str], SafetyCategory)] = &[
    (&["adult", "sexual"], SafetyCategory::Adult),
    (&["violen"], SafetyCategory::Violence),
    (&["hate"], SafetyCategory::HateSpeech),
    (&["profan"], SafetyCategory::Profanity),
];

/// Maps a free-form classifier label onto the taxonomy
pub fn normalize_category(label: &str) -> SafetyCategory {
    let lowered = label.to_lowercase();
    CATEGORY_MARKERS
        .iter()
        .find(|(markers, _)| markers.iter().any(|marker| lowered.contains(marker)))
        .map(|(_, category)| *category)
        .unwrap_or(SafetyCategory::Safe)
}

/// Reconciles a raw classifier verdict into an `AnalysisResult`.
///
/// `Safe` labels are dropped from the flagged set. An unsafe verdict with
/// nothing left is tagged `Adult`; an empty set otherwise becomes `{Safe}`.
/// `is_safe`, score, reasoning and phrases pass through as reported; the
/// score is only rounded into the 0-100 range.
pub fn normalize(raw: RawVerdict) -> AnalysisResult {
    let mut categories: BTreeSet<SafetyCategory> = raw
        .categories
        .iter()
        .map(|label| normalize_category(label))
        .filter(|category| *category != SafetyCategory::Safe)
        .collect();

    if !raw.is_safe && categories.is_empty() {
        categories.insert(SafetyCategory::Adult);
    }
    if categories.is_empty() {
        categories.insert(SafetyCategory::Safe);
    }

    AnalysisResult {
        is_safe: raw.is_safe,
        score: raw.score.round().clamp(0.0, 100.0) as u8,
        categories,
        reasoning: raw.reasoning,
        flagged_phrases: raw.flagged_phrases,
    }
}

/// Conservative verdict used whenever the classifier cannot be trusted.
/// This is the only verdict allowed to carry no categories.
pub fn fallback() -> AnalysisResult {
    AnalysisResult {
        is_safe: false,
        score: 0,
        categories: BTreeSet::new(),
        reasoning: FAILURE_REASONING.to_string(),
        flagged_phrases: vec![],
    }
}

/// Turns the outcome of a classify call into a verdict, never failing
pub fn resolve(outcome: Result<RawVerdict, ClassifyError>) -> AnalysisResult {
    match outcome {
        Ok(raw) => normalize(raw),
        Err(e) => {
            warn!(error = %e, "classification failed, using fallback verdict");
            fallback()
        }
    }
}
