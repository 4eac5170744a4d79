use crate::classifier::{Classifier, HttpClassifier, Sensitivity};
use crate::config::GuardConfig;
use crate::error::GuardError;
use crate::matcher::match_rules;
use crate::normalizer;
use crate::rules::{BlockRule, RuleStore, default_rules};
use crate::schedule::uninstall_lock;
use crate::types::{AnalysisResult, LogEntry, Stats};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Decision log and the statistics folded from it. Both change together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Activity {
    /// Newest first
    pub logs: VecDeque<LogEntry>,
    pub stats: Stats,
}

impl Activity {
    fn record(&mut self, entry: LogEntry) {
        self.stats = self.stats.absorb(&entry.result);
        self.logs.push_front(entry);
    }
}

/// Decision pipeline: local block list, then remote classification,
/// then normalization and bookkeeping.
pub struct ContentGuard {
    config: GuardConfig,
    sensitivity: RwLock<Sensitivity>,
    rules: RuleStore,
    classifier: Arc<dyn Classifier>,
    activity: Arc<RwLock<Activity>>,
    in_flight: Mutex<()>,
}

impl ContentGuard {
    /// Create a guard talking to the configured HTTP classifier
    pub fn new(config: GuardConfig) -> Result<Self> {
        let classifier = HttpClassifier::new(&config.classifier)?;
        Ok(Self::with_classifier(config, Arc::new(classifier)))
    }

    /// Create a guard around any classifier implementation
    pub fn with_classifier(config: GuardConfig, classifier: Arc<dyn Classifier>) -> Self {
        let rules = RuleStore::new(Self::seed_rules(&config));

        Self {
            sensitivity: RwLock::new(config.sensitivity),
            config,
            rules,
            classifier,
            activity: Arc::new(RwLock::new(Activity::default())),
            in_flight: Mutex::new(()),
        }
    }

    fn seed_rules(config: &GuardConfig) -> Vec<BlockRule> {
        if config.seed_default_rules {
            default_rules()
        } else {
            vec![]
        }
    }

    /// Produces a verdict for `text` without recording it.
    ///
    /// A local block short-circuits the classifier. Classifier failures are
    /// absorbed into the fallback verdict, so the only error is blank input.
    pub async fn decide(
        &self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<AnalysisResult, GuardError> {
        if text.trim().is_empty() {
            return Err(GuardError::EmptyInput);
        }

        let rules = self.rules.snapshot().await;
        if let Some(result) = match_rules(text, &rules, now) {
            return Ok(result);
        }

        let sensitivity = *self.sensitivity.read().await;
        debug!(%sensitivity, "no local block, classifying remotely");
        let outcome = self.classifier.classify(text, sensitivity).await;
        Ok(normalizer::resolve(outcome))
    }

    /// Decides and records one submission at the current time
    pub async fn submit(&self, text: &str) -> Result<LogEntry, GuardError> {
        self.submit_at(text, Utc::now()).await
    }

    /// Decides and records one submission. Submissions run one at a time;
    /// the log entry and the stats fold are applied under a single lock.
    pub async fn submit_at(&self, text: &str, now: DateTime<Utc>) -> Result<LogEntry, GuardError> {
        let _turn = self.in_flight.lock().await;

        let result = self.decide(text, now).await?;
        let entry = LogEntry::new(text, result, now, self.config.snippet_chars);

        self.activity.write().await.record(entry.clone());
        info!(
            id = %entry.id,
            safe = entry.result.is_safe,
            score = entry.result.score,
            "submission recorded"
        );
        Ok(entry)
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub async fn sensitivity(&self) -> Sensitivity {
        *self.sensitivity.read().await
    }

    pub async fn set_sensitivity(&self, sensitivity: Sensitivity) {
        *self.sensitivity.write().await = sensitivity;
        info!(%sensitivity, "sensitivity changed");
    }

    /// Recorded decisions, newest first
    pub async fn logs(&self) -> Vec<LogEntry> {
        self.activity.read().await.logs.iter().cloned().collect()
    }

    pub async fn stats(&self) -> Stats {
        self.activity.read().await.stats.clone()
    }

    pub async fn activity(&self) -> Activity {
        self.activity.read().await.clone()
    }

    /// Drops the log and zeroes the statistics
    pub async fn clear_activity(&self) {
        let mut activity = self.activity.write().await;
        activity.logs.clear();
        activity.stats = Stats::reset();
        info!("activity cleared");
    }

    /// Latest future window end that currently prevents uninstalling
    pub async fn uninstall_lock(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        uninstall_lock(&self.rules.snapshot().await, now)
    }

    /// Wipes activity, rules and sensitivity back to a fresh install,
    /// unless a scheduled block window has not yet ended.
    pub async fn uninstall(&self, now: DateTime<Utc>) -> Result<(), GuardError> {
        let _turn = self.in_flight.lock().await;

        if let Some(until) = self.uninstall_lock(now).await {
            return Err(GuardError::UninstallLocked { until });
        }

        *self.activity.write().await = Activity::default();
        self.rules.replace(Self::seed_rules(&self.config)).await;
        *self.sensitivity.write().await = self.config.sensitivity;
        info!("guard reset to a fresh install");
        Ok(())
    }
}
