use crate::config::ClassifierConfig;
use crate::error::ClassifyError;
use crate::types::RawVerdict;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// How hard the remote classifier should look for problems
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sensitivity {
    Strict,
    #[default]
    Moderate,
    Off,
}

impl Sensitivity {
    /// System instruction sent with every classification request
    pub fn instruction(&self) -> String {
        let base =
            "You are a content moderation AI. Your goal is to analyze text for 18+, explicit, violent, or hateful content.";
        let level = match self {
            Sensitivity::Strict => {
                "You must be extremely strict. Flag any hint of impropriety, including mild profanity or suggestive themes."
            }
            Sensitivity::Moderate => {
                "Be balanced. Flag explicit adult content, severe violence, and hate speech. Allow mild slang or non-explicit context."
            }
            Sensitivity::Off => {
                "Analyze objectively without filtering, but accurately label the content categories."
            }
        };
        format!("{} {}", base, level)
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sensitivity::Strict => "STRICT",
            Sensitivity::Moderate => "MODERATE",
            Sensitivity::Off => "OFF",
        })
    }
}

impl FromStr for Sensitivity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Sensitivity::Strict),
            "moderate" => Ok(Sensitivity::Moderate),
            "off" => Ok(Sensitivity::Off),
            other => Err(anyhow::anyhow!("Unknown sensitivity level: {}", other)),
        }
    }
}

/// Remote judgment of a piece of text
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        text: &str,
        sensitivity: Sensitivity,
    ) -> Result<RawVerdict, ClassifyError>;
}

/// Decodes the classifier's JSON text into a validated verdict
pub fn decode_verdict(payload: &str) -> Result<RawVerdict, ClassifyError> {
    if payload.trim().is_empty() {
        return Err(ClassifyError::EmptyResponse);
    }

    let verdict: RawVerdict = serde_json::from_str(payload)?;
    if !verdict.score.is_finite() {
        return Err(ClassifyError::InvalidScore);
    }
    Ok(verdict)
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|part| part.text.as_deref())
    }
}

/// Classifier backed by a `generateContent` style JSON endpoint
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let mut base = config.endpoint.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint =
            Url::parse(&base)?.join(&format!("models/{}:generateContent", config.model))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_body(text: &str, sensitivity: Sensitivity) -> serde_json::Value {
        json!({
            "systemInstruction": { "parts": [{ "text": sensitivity.instruction() }] },
            "contents": [{
                "role": "user",
                "parts": [{ "text": format!("Analyze the following text: \"{}\"", text) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "isSafe": {
                            "type": "BOOLEAN",
                            "description": "Whether the content is considered safe based on standard community guidelines."
                        },
                        "score": {
                            "type": "NUMBER",
                            "description": "A safety score from 0 (very unsafe) to 100 (completely safe)."
                        },
                        "categories": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "List of categories detected: 'Adult Content', 'Violence', 'Hate Speech', 'Profanity', or 'Safe'."
                        },
                        "reasoning": {
                            "type": "STRING",
                            "description": "A brief explanation of why the content was flagged or marked safe."
                        },
                        "flaggedPhrases": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "Specific words or phrases that triggered the filter."
                        }
                    },
                    "required": ["isSafe", "score", "categories", "reasoning", "flaggedPhrases"]
                }
            }
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(
        &self,
        text: &str,
        sensitivity: Sensitivity,
    ) -> Result<RawVerdict, ClassifyError> {
        debug!(%sensitivity, chars = text.chars().count(), "sending text to classifier");

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&Self::request_body(text, sensitivity));
        if let Some(key) = &self.api_key {
            request = request.header("x-goog-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClassifyError::Status(status.as_u16()));
        }

        let body: GenerateResponse = serde_json::from_str(&response.text().await?)?;
        let payload = body.first_text().ok_or(ClassifyError::EmptyResponse)?;
        decode_verdict(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_complete_payload() {
        let verdict = decode_verdict(
            r#"{"isSafe":false,"score":12.5,"categories":["Violence"],"reasoning":"threat","flaggedPhrases":["hurt"]}"#,
        )
        .unwrap();

        assert!(!verdict.is_safe);
        assert_eq!(verdict.score, 12.5);
        assert_eq!(verdict.categories, vec!["Violence".to_string()]);
        assert_eq!(verdict.flagged_phrases, vec!["hurt".to_string()]);
    }

    #[test]
    fn missing_phrases_default_to_empty() {
        let payload = r#"{"isSafe":true,"score":99,"categories":[],"reasoning":"fine"}"#;
        let verdict = decode_verdict(payload).unwrap();
        assert!(verdict.flagged_phrases.is_empty());
    }

    #[test]
    fn rejects_empty_and_malformed_payloads() {
        assert!(matches!(decode_verdict("  "), Err(ClassifyError::EmptyResponse)));
        assert!(matches!(decode_verdict("not json"), Err(ClassifyError::Malformed(_))));
        assert!(matches!(
            decode_verdict(r#"{"isSafe":"yes","score":1,"categories":[],"reasoning":""}"#),
            Err(ClassifyError::Malformed(_))
        ));
    }

    #[test]
    fn reads_first_candidate_text() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"isSafe\":true}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(body.first_text(), Some("{\"isSafe\":true}"));

        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.first_text(), None);
    }

    #[test]
    fn builds_model_endpoint() {
        let classifier = HttpClassifier::new(&ClassifierConfig::default()).unwrap();
        assert_eq!(
            classifier.endpoint().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn sensitivity_parses_and_shapes_instruction() {
        assert_eq!("Strict".parse::<Sensitivity>().unwrap(), Sensitivity::Strict);
        assert_eq!(" off ".parse::<Sensitivity>().unwrap(), Sensitivity::Off);
        assert!("loose".parse::<Sensitivity>().is_err());

        assert!(Sensitivity::Strict.instruction().contains("extremely strict"));
        assert!(Sensitivity::Moderate.instruction().contains("Be balanced"));
        assert!(Sensitivity::Off.instruction().starts_with("You are a content moderation AI."));
    }
}
