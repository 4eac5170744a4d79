use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors surfaced to callers of the guard and the rule store
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("content is empty")]
    EmptyInput,

    #[error("invalid schedule: end {end} must be after start {start}")]
    InvalidSchedule {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("no block rule with id {0}")]
    RuleNotFound(String),

    #[error("uninstall is locked by an active schedule until {until}")]
    UninstallLocked { until: DateTime<Utc> },
}

/// Failures of the external classifier. These never leave the pipeline;
/// they are folded into the fallback verdict.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classifier request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("classifier returned HTTP {0}")]
    Status(u16),

    #[error("classifier returned an empty response")]
    EmptyResponse,

    #[error("classifier payload could not be decoded: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("classifier returned a non-finite score")]
    InvalidScore,
}
