use crate::classifier::Sensitivity;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Connection settings for the remote classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta/".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// Configuration for the content guard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    pub sensitivity: Sensitivity,
    pub classifier: ClassifierConfig,
    /// Start from the built-in block list rather than an empty one
    pub seed_default_rules: bool,
    /// Characters of submitted text kept in each log entry
    pub snippet_chars: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::moderate()
    }
}

impl GuardConfig {
    /// Flags any hint of impropriety. Best for children.
    pub fn strict() -> Self {
        Self {
            sensitivity: Sensitivity::Strict,
            ..Self::moderate()
        }
    }

    /// Blocks explicit content and hate speech, allows mild language
    pub fn moderate() -> Self {
        Self {
            sensitivity: Sensitivity::Moderate,
            classifier: ClassifierConfig::default(),
            seed_default_rules: true,
            snippet_chars: 50,
        }
    }

    /// Content is labelled and logged but judged without filtering bias
    pub fn off() -> Self {
        Self {
            sensitivity: Sensitivity::Off,
            ..Self::moderate()
        }
    }

    /// Default configuration overridden by `GUARDIAN_*` environment variables.
    /// The API key is also read from `API_KEY`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(key) = env::var("GUARDIAN_API_KEY").or_else(|_| env::var("API_KEY")) {
            config.classifier.api_key = Some(key).filter(|k| !k.is_empty());
        }
        if let Ok(model) = env::var("GUARDIAN_MODEL") {
            config.classifier.model = model;
        }
        if let Ok(endpoint) = env::var("GUARDIAN_ENDPOINT") {
            config.classifier.endpoint = endpoint;
        }
        if let Ok(level) = env::var("GUARDIAN_SENSITIVITY") {
            config.sensitivity = level.parse()?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_only_in_sensitivity() {
        assert_eq!(GuardConfig::strict().sensitivity, Sensitivity::Strict);
        assert_eq!(GuardConfig::default().sensitivity, Sensitivity::Moderate);
        assert_eq!(GuardConfig::off().sensitivity, Sensitivity::Off);

        let strict = GuardConfig::strict();
        assert!(strict.seed_default_rules);
        assert_eq!(strict.snippet_chars, 50);
        assert_eq!(strict.classifier.model, "gemini-2.5-flash");
    }

    #[test]
    fn config_round_trips_through_json() {
        let json = serde_json::to_string(&GuardConfig::strict()).unwrap();
        assert!(json.contains("\"STRICT\""));

        let back: GuardConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sensitivity, Sensitivity::Strict);
    }
}
