use crate::error::GuardError;
use crate::schedule::Schedule;

use anyhow::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Category assigned to rules added by hand or by bulk import
pub const CUSTOM_CATEGORY: &str = "Custom Block";

/// A blocked domain or keyword with an optional blocking window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRule {
    pub id: String,
    /// Case-insensitive substring matched against submitted text
    pub url: String,
    pub category: String,
    /// `None` blocks around the clock
    pub schedule: Option<Schedule>,
}

impl BlockRule {
    fn custom(url: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: url.to_string(),
            category: CUSTOM_CATEGORY.to_string(),
            schedule: None,
        }
    }
}

/// Rules shipped with a fresh install
pub fn default_rules() -> Vec<BlockRule> {
    [
        ("1", "adult-example.com", "Adult Content"),
        ("2", "gambling-demo-site.net", "Gambling"),
        ("3", "explicit-content.org", "Adult Content"),
        ("4", "violence-hub-demo.com", "Violence"),
        ("5", "restricted-zone.net", "Restricted"),
    ]
    .into_iter()
    .map(|(id, url, category)| BlockRule {
        id: id.to_string(),
        url: url.to_string(),
        category: category.to_string(),
        schedule: None,
    })
    .collect()
}

/// Outcome of a bulk import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Tokens that survived parsing
    pub parsed: usize,
    /// Tokens that became new rules (duplicates excluded)
    pub added: usize,
}

/// Splits a pasted or uploaded list into cleaned site entries.
///
/// Tokens are separated by newlines, commas, carriage returns or semicolons.
/// Anything of three characters or fewer is discarded, then a leading
/// `http://`/`https://` and one trailing slash are stripped.
pub fn parse_import(blob: &str) -> Result<Vec<String>> {
    let delimiters = Regex::new(r"[\n,\r;]+")
        .map_err(|e| anyhow::anyhow!("Failed to compile regex: {}", e))?;
    let protocol = Regex::new(r"^https?://")
        .map_err(|e| anyhow::anyhow!("Failed to compile regex: {}", e))?;

    Ok(delimiters
        .split(blob)
        .map(str::trim)
        .filter(|token| token.chars().count() > 3)
        .map(|token| {
            let stripped = protocol.replace(token, "");
            stripped.strip_suffix('/').unwrap_or(&*stripped).to_string()
        })
        .collect())
}

/// Shared, ordered block list. Readers take a snapshot; writers replace
/// whole rules under the write lock.
#[derive(Debug, Clone)]
pub struct RuleStore {
    rules: Arc<RwLock<Vec<BlockRule>>>,
}

impl RuleStore {
    pub fn new(rules: Vec<BlockRule>) -> Self {
        Self {
            rules: Arc::new(RwLock::new(rules)),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(default_rules())
    }

    /// Copy of the current list, in match order
    pub async fn snapshot(&self) -> Vec<BlockRule> {
        self.rules.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.rules.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rules.read().await.is_empty()
    }

    /// Adds a permanent custom rule at the front of the list.
    ///
    /// Returns `None` without touching the list if the url is blank or
    /// already present (compared case-insensitively).
    pub async fn add(&self, url: &str) -> Option<BlockRule> {
        let url = url.trim();
        if url.is_empty() {
            return None;
        }

        let mut rules = self.rules.write().await;
        let lowered = url.to_lowercase();
        if rules.iter().any(|rule| rule.url.to_lowercase() == lowered) {
            debug!(url, "duplicate block rule ignored");
            return None;
        }

        let rule = BlockRule::custom(url);
        rules.insert(0, rule.clone());
        info!(url, id = %rule.id, "block rule added");
        Some(rule)
    }

    /// Sets (`Some((start, end))`) or clears (`None`) a rule's window.
    /// An invalid window leaves the rule unchanged.
    pub async fn update_schedule(
        &self,
        id: &str,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<BlockRule, GuardError> {
        let schedule = window
            .map(|(start, end)| Schedule::new(start, end))
            .transpose()?;

        let mut rules = self.rules.write().await;
        let rule = rules
            .iter_mut()
            .find(|rule| rule.id == id)
            .ok_or_else(|| GuardError::RuleNotFound(id.to_string()))?;

        rule.schedule = schedule;
        match schedule {
            Some(window) => {
                info!(id, start = %window.start, end = %window.end, "block schedule set")
            }
            None => info!(id, "block schedule cleared"),
        }
        Ok(rule.clone())
    }

    /// Adds every entry of a bulk list, skipping duplicates
    pub async fn import(&self, blob: &str) -> Result<ImportSummary> {
        let entries = parse_import(blob)?;
        let mut summary = ImportSummary {
            parsed: entries.len(),
            added: 0,
        };

        for entry in entries {
            if self.add(&entry).await.is_some() {
                summary.added += 1;
            }
        }

        info!(parsed = summary.parsed, added = summary.added, "bulk import finished");
        Ok(summary)
    }

    /// Replaces the whole list
    pub async fn replace(&self, rules: Vec<BlockRule>) {
        *self.rules.write().await = rules;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn parse_import_splits_and_cleans() {
        let blob = "https://bad-site.com/\nfoo;http://other.org,abc\r\n  spaced-site.net  ;;";
        let entries = parse_import(blob).unwrap();

        assert_eq!(entries, vec!["bad-site.com", "other.org", "spaced-site.net"]);
    }

    #[test]
    fn parse_import_keeps_inner_path() {
        let entries = parse_import("https://example.com/path/").unwrap();
        assert_eq!(entries, vec!["example.com/path"]);
    }

    #[tokio::test]
    async fn add_prepends_and_ignores_duplicates() {
        let store = RuleStore::with_defaults();

        let added = store.add("new-site.io").await.unwrap();
        assert_eq!(added.category, CUSTOM_CATEGORY);
        assert!(added.schedule.is_none());
        assert_eq!(store.snapshot().await[0].url, "new-site.io");

        assert!(store.add("ADULT-EXAMPLE.COM").await.is_none());
        assert!(store.add("   ").await.is_none());
        assert_eq!(store.len().await, 6);
    }

    #[tokio::test]
    async fn schedule_update_replaces_both_bounds() {
        let store = RuleStore::with_defaults();
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = start + Duration::hours(8);

        let rule = store.update_schedule("2", Some((start, end))).await.unwrap();
        assert_eq!(rule.schedule, Some(Schedule { start, end }));

        let rule = store.update_schedule("2", None).await.unwrap();
        assert!(rule.schedule.is_none());
    }

    #[tokio::test]
    async fn invalid_schedule_leaves_rule_unchanged() {
        let store = RuleStore::with_defaults();
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = start + Duration::hours(1);
        store.update_schedule("1", Some((start, end))).await.unwrap();

        let err = store.update_schedule("1", Some((end, start))).await.unwrap_err();
        assert!(matches!(err, GuardError::InvalidSchedule { .. }));

        let rules = store.snapshot().await;
        let rule = rules.iter().find(|r| r.id == "1").unwrap();
        assert_eq!(rule.schedule, Some(Schedule { start, end }));
    }

    #[tokio::test]
    async fn unknown_rule_is_reported() {
        let store = RuleStore::new(vec![]);
        let err = store.update_schedule("missing", None).await.unwrap_err();
        assert!(matches!(err, GuardError::RuleNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn import_counts_new_rules_only() {
        let store = RuleStore::with_defaults();
        let summary = store
            .import("https://adult-example.com/\nfresh-one.com\nfresh-two.com,fresh-one.com")
            .await
            .unwrap();

        assert_eq!(summary, ImportSummary { parsed: 4, added: 2 });
        assert_eq!(store.len().await, 7);
    }
}
