use crate::rules::BlockRule;
use crate::schedule::{self, ScheduleStatus};
use crate::types::{AnalysisResult, SafetyCategory};

use chrono::{DateTime, Utc};
use tracing::debug;

/// Format used when a verdict names the end of a blocking window
const END_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Checks text against the local block list before any remote analysis.
///
/// Rules are tried in list order and the first one whose pattern occurs in
/// the text (case-insensitively) and whose schedule is permanent or active
/// wins. A pending or expired rule does not block; the text falls through
/// to the classifier.
pub fn match_rules(text: &str, rules: &[BlockRule], now: DateTime<Utc>) -> Option<AnalysisResult> {
    let lowered = text.to_lowercase();

    for rule in rules {
        let pattern = rule.url.to_lowercase();
        if pattern.is_empty() || !lowered.contains(&pattern) {
            continue;
        }

        let status = schedule::status(rule, now);
        if !status.blocks() {
            debug!(rule = %rule.url, ?status, "block rule matched outside its window");
            continue;
        }

        debug!(rule = %rule.url, ?status, "text blocked by local rule");
        return Some(blocked_verdict(rule, status));
    }

    None
}

fn blocked_verdict(rule: &BlockRule, status: ScheduleStatus) -> AnalysisResult {
    let reasoning = match (status, rule.schedule) {
        (ScheduleStatus::Active, Some(window)) => format!(
            "Access to '{}' is restricted by schedule until {}.",
            rule.url,
            window.end.format(END_FORMAT)
        ),
        _ => format!(
            "Access to '{}' is permanently restricted by the Block List.",
            rule.url
        ),
    };

    AnalysisResult {
        is_safe: false,
        score: 0,
        categories: [SafetyCategory::Adult].into_iter().collect(),
        reasoning,
        flagged_phrases: vec![rule.url.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Schedule;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap()
    }

    fn rule(id: &str, url: &str, schedule: Option<Schedule>) -> BlockRule {
        BlockRule {
            id: id.into(),
            url: url.into(),
            category: "Custom Block".into(),
            schedule,
        }
    }

    #[test]
    fn permanent_rule_blocks_case_insensitively() {
        let rules = vec![rule("1", "Adult-Example.com", None)];
        let result = match_rules("visit ADULT-EXAMPLE.COM now", &rules, now()).unwrap();

        assert!(!result.is_safe);
        assert_eq!(result.score, 0);
        assert_eq!(result.categories, [SafetyCategory::Adult].into_iter().collect());
        assert_eq!(result.flagged_phrases, vec!["Adult-Example.com".to_string()]);
        assert!(result.reasoning.contains("permanently restricted"));
    }

    #[test]
    fn no_match_returns_none() {
        let rules = vec![rule("1", "adult-example.com", None)];
        assert!(match_rules("a perfectly ordinary sentence", &rules, now()).is_none());
        assert!(match_rules("anything", &[], now()).is_none());
    }

    #[test]
    fn active_window_blocks_and_names_end() {
        let window = Schedule::new(now() - Duration::hours(1), now() + Duration::hours(1)).unwrap();
        let rules = vec![rule("1", "timed.net", Some(window))];

        let result = match_rules("go to timed.net", &rules, now()).unwrap();
        assert!(result.reasoning.contains("restricted by schedule until 2025-06-01 10:30 UTC"));
    }

    #[test]
    fn pending_and_expired_windows_fall_through() {
        let pending =
            Schedule::new(now() + Duration::hours(1), now() + Duration::hours(2)).unwrap();
        let expired =
            Schedule::new(now() - Duration::hours(2), now() - Duration::hours(1)).unwrap();
        let rules = vec![
            rule("1", "timed.net", Some(pending)),
            rule("2", "timed.net", Some(expired)),
        ];

        assert!(match_rules("go to timed.net", &rules, now()).is_none());
    }

    #[test]
    fn skipped_rule_does_not_hide_later_match() {
        let expired =
            Schedule::new(now() - Duration::hours(2), now() - Duration::hours(1)).unwrap();
        let rules = vec![
            rule("1", "site.org", Some(expired)),
            rule("2", "bad-site.org", None),
        ];

        let result = match_rules("bad-site.org", &rules, now()).unwrap();
        assert_eq!(result.flagged_phrases, vec!["bad-site.org".to_string()]);
    }

    #[test]
    fn first_listed_rule_wins() {
        let rules = vec![rule("1", "example", None), rule("2", "example.com", None)];

        let first = match_rules("example.com", &rules, now()).unwrap();
        let again = match_rules("example.com", &rules, now()).unwrap();

        assert_eq!(first.flagged_phrases, vec!["example".to_string()]);
        assert_eq!(first, again);
    }
}
