use crate::error::GuardError;
use crate::rules::BlockRule;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blocking window of a rule. Both bounds are always present together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Schedule {
    /// Builds a window, rejecting `end <= start`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, GuardError> {
        if end <= start {
            return Err(GuardError::InvalidSchedule { start, end });
        }
        Ok(Self { start, end })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleStatus {
    Permanent,
    Active,
    Pending,
    Expired,
}

impl ScheduleStatus {
    /// Whether a matching rule in this state blocks content
    pub fn blocks(&self) -> bool {
        matches!(self, ScheduleStatus::Permanent | ScheduleStatus::Active)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScheduleStatus::Permanent => "Permanently Blocked",
            ScheduleStatus::Active => "Active Block Schedule",
            ScheduleStatus::Pending => "Scheduled (Pending)",
            ScheduleStatus::Expired => "Schedule Expired (Allowed)",
        }
    }
}

/// Evaluates an optional window against `now`. Both edges are inclusive.
pub fn evaluate(schedule: Option<&Schedule>, now: DateTime<Utc>) -> ScheduleStatus {
    match schedule {
        None => ScheduleStatus::Permanent,
        Some(window) if now < window.start => ScheduleStatus::Pending,
        Some(window) if now <= window.end => ScheduleStatus::Active,
        Some(_) => ScheduleStatus::Expired,
    }
}

pub fn status(rule: &BlockRule, now: DateTime<Utc>) -> ScheduleStatus {
    evaluate(rule.schedule.as_ref(), now)
}

/// Latest window end strictly after `now`, if any. While this is `Some`,
/// uninstalling is refused.
pub fn uninstall_lock(rules: &[BlockRule], now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    rules
        .iter()
        .filter_map(|rule| rule.schedule.map(|window| window.end))
        .filter(|end| *end > now)
        .max()
}
