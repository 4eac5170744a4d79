//! GuardianNet content guard
//!
//! Decides whether submitted text is safe. Text is first checked against a
//! local, schedule-aware block list; only when no rule applies is it sent to
//! a remote classifier, whose free-form verdict is normalized into a fixed
//! category taxonomy. Every recorded decision lands in an activity log and
//! is folded into running statistics.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use guardian_net::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let guard = ContentGuard::new(GuardConfig::from_env()?)?;
//!
//!     let entry = guard.submit("visit adult-example.com now").await?;
//!     if !entry.result.is_safe {
//!         println!("Blocked: {}", entry.result.reasoning);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod guard;
pub mod matcher;
pub mod normalizer;
pub mod rules;
pub mod schedule;
pub mod types;

pub use classifier::{Classifier, HttpClassifier, Sensitivity};
pub use config::{ClassifierConfig, GuardConfig};
pub use error::{ClassifyError, GuardError};
pub use guard::{Activity, ContentGuard};
pub use rules::{BlockRule, ImportSummary, RuleStore};
pub use schedule::{Schedule, ScheduleStatus};
pub use types::{AnalysisResult, LogEntry, RawVerdict, SafetyCategory, Stats};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        AnalysisResult, BlockRule, Classifier, ContentGuard, GuardConfig, GuardError, LogEntry,
        RawVerdict, SafetyCategory, Sensitivity, Stats,
    };
}
