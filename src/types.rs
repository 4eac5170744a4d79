use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

/// Fixed taxonomy every verdict is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SafetyCategory {
    #[serde(rename = "Adult Content")]
    Adult,
    #[serde(rename = "Violence")]
    Violence,
    #[serde(rename = "Hate Speech")]
    HateSpeech,
    #[serde(rename = "Profanity")]
    Profanity,
    #[serde(rename = "Safe")]
    Safe,
}

impl SafetyCategory {
    pub fn label(&self) -> &'static str {
        match self {
            SafetyCategory::Adult => "Adult Content",
            SafetyCategory::Violence => "Violence",
            SafetyCategory::HateSpeech => "Hate Speech",
            SafetyCategory::Profanity => "Profanity",
            SafetyCategory::Safe => "Safe",
        }
    }
}

impl fmt::Display for SafetyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized verdict for one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub is_safe: bool,
    /// 0 to 100, where 100 is completely safe
    pub score: u8,
    pub categories: BTreeSet<SafetyCategory>,
    pub reasoning: String,
    pub flagged_phrases: Vec<String>,
}

/// Verdict exactly as the external classifier reported it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVerdict {
    pub is_safe: bool,
    pub score: f64,
    pub categories: Vec<String>,
    pub reasoning: String,
    #[serde(default)]
    pub flagged_phrases: Vec<String>,
}

/// One recorded decision in the activity log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub snippet: String,
    pub result: AnalysisResult,
}

impl LogEntry {
    pub fn new(
        text: &str,
        result: AnalysisResult,
        timestamp: DateTime<Utc>,
        snippet_chars: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            snippet: snippet(text, snippet_chars),
            result,
        }
    }
}

/// Truncates on character boundaries and marks the cut with "..."
pub fn snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Running statistics over every recorded decision
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_scanned: u64,
    pub blocked_count: u64,
    pub category_breakdown: BTreeMap<SafetyCategory, u64>,
}

impl Stats {
    /// Folds one decision into a new set of counters.
    ///
    /// Categories are only counted for unsafe verdicts; a safe verdict never
    /// touches the breakdown, whatever categories it carries.
    pub fn absorb(&self, result: &AnalysisResult) -> Stats {
        let mut next = self.clone();
        next.total_scanned += 1;

        if !result.is_safe {
            next.blocked_count += 1;
            for category in &result.categories {
                *next.category_breakdown.entry(*category).or_insert(0) += 1;
            }
        }

        next
    }

    pub fn reset() -> Stats {
        Stats::default()
    }

    pub fn block_percentage(&self) -> f64 {
        if self.total_scanned == 0 {
            0.0
        } else {
            (self.blocked_count as f64 / self.total_scanned as f64) * 100.0
        }
    }
}
