//! Classifier and summarizer backed by a local Ollama server
//!
//! Both enrichers call `/api/generate` without streaming. The classifier
//! constrains the model to a JSON schema and validates what comes back;
//! the summarizer returns the trimmed completion.

use crate::config::OllamaConfig;
use crate::enrich::{Classifier, Summarizer};
use crate::error::EnrichError;
use crate::types::Classification;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const CLASSIFICATION_PROMPT: &str = r#"You are an email classifier.

Classify each email according to the following schema:

- type: one of ["spam", "news", "social", "opportunities"]
- priority: one of ["high", "medium", "low"]
- reason: a short explanation of why the email was classified that way

### Examples

Email: "Apply now to the Google Summer Internship"
Type: opportunities
Priority: high
Reason: This is an internship opportunity from a well-known company.

---

Email: "Your daily news digest is here!"
Type: news
Priority: medium
Reason: It's a regular news update with informational content.

---

Email: "Join us for the IEEE Hackathon 2025!"
Type: opportunities
Priority: high
Reason: A competitive event offering learning, networking, and rewards.

---

Email: "Congratulations! You've won a new iPhone"
Type: spam
Priority: low
Reason: This is likely promotional or deceptive content.

---

Email: "Hey, let's catch up this weekend!"
Type: social
Priority: low
Reason: A friendly message from a personal contact.

---

Now classify the following email:

{body}

Return the classification in JSON format."#;

const SUMMARY_PROMPT: &str = r"You are an expert email summarizer.
Your task is to read the content of an email and generate a short, clear, and professional summary in **1-3 sentences**.

- Focus on the **main point**, purpose, or call to action.
- Remove signatures, greetings, and irrelevant formatting.
- If the email contains event details, deadlines, or offers, highlight them.

Email:
{body}

Return only the summary.";

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama client implementing both enricher traits
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self, EnrichError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| EnrichError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub const fn config(&self) -> &OllamaConfig {
        &self.config
    }

    async fn generate(
        &self,
        prompt: &str,
        format: Option<serde_json::Value>,
    ) -> Result<String, EnrichError> {
        let url = format!("{}/api/generate", self.config.url.trim_end_matches('/'));
        let mut request = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": self.config.temperature },
        });
        if let Some(format) = format {
            request["format"] = format;
        }

        debug!(url = url.as_str(), model = self.config.model.as_str(), "Calling Ollama");

        let resp = self.client.post(&url).json(&request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(EnrichError::Transport(format!("Ollama returned status: {status}")));
        }

        let parsed: GenerateResponse = resp.json().await?;
        Ok(parsed.response)
    }
}

#[async_trait]
impl Classifier for OllamaClient {
    async fn classify(&self, body: &str) -> Result<Classification, EnrichError> {
        let response = self
            .generate(&classification_prompt(body), Some(classification_schema()))
            .await?;
        Classification::from_json_str(&response)
    }
}

#[async_trait]
impl Summarizer for OllamaClient {
    async fn summarize(&self, body: &str) -> Result<String, EnrichError> {
        let response = self.generate(&summary_prompt(body), None).await?;
        parse_summary(&response)
    }
}

fn classification_prompt(body: &str) -> String {
    CLASSIFICATION_PROMPT.replace("{body}", body)
}

fn summary_prompt(body: &str) -> String {
    SUMMARY_PROMPT.replace("{body}", body)
}

/// JSON schema passed as Ollama's `format` to constrain classifier output
fn classification_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "type": {
                "type": "string",
                "enum": ["spam", "news", "social", "opportunities"],
                "description": "The type of classification for the email"
            },
            "priority": {
                "type": "string",
                "enum": ["high", "medium", "low"],
                "description": "The priority of the email"
            },
            "reason": {
                "type": "string",
                "description": "The reason for the classification"
            }
        },
        "required": ["type", "priority", "reason"]
    })
}

fn parse_summary(response: &str) -> Result<String, EnrichError> {
    let summary = response.trim();
    if summary.is_empty() {
        return Err(EnrichError::MalformedResponse("Ollama returned an empty summary".into()));
    }
    Ok(summary.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Priority};

    #[test]
    fn classification_prompt_embeds_body_after_examples() {
        let prompt = classification_prompt("Apply now!");
        let examples = prompt.find("Google Summer Internship").unwrap();
        let body = prompt.find("Apply now!").unwrap();

        assert!(body > examples);
        assert!(!prompt.contains("{body}"));
        assert!(prompt.ends_with("Return the classification in JSON format."));
    }

    #[test]
    fn summary_prompt_embeds_body() {
        let prompt = summary_prompt("Meeting moved to 3pm");
        assert!(prompt.contains("Email:\nMeeting moved to 3pm\n"));
        assert!(!prompt.contains("{body}"));
    }

    #[test]
    fn schema_lists_every_category_and_priority() {
        let schema = classification_schema();
        let types = schema["properties"]["type"]["enum"].as_array().unwrap();
        let priorities = schema["properties"]["priority"]["enum"].as_array().unwrap();

        assert_eq!(types.len(), 4);
        assert_eq!(priorities.len(), 3);
        for category in [
            Category::Spam,
            Category::News,
            Category::Social,
            Category::Opportunities,
        ] {
            assert!(types.contains(&serde_json::json!(category.as_str())));
        }
        for priority in [Priority::High, Priority::Medium, Priority::Low] {
            assert!(priorities.contains(&serde_json::json!(priority.as_str())));
        }
    }

    #[test]
    fn summary_is_trimmed() {
        assert_eq!(parse_summary("  A short summary.\n").unwrap(), "A short summary.");
    }

    #[test]
    fn empty_summary_is_rejected() {
        assert!(matches!(
            parse_summary(" \n "),
            Err(EnrichError::MalformedResponse(_))
        ));
    }

    #[test]
    fn client_builds_with_default_config() {
        let client = OllamaClient::new(OllamaConfig::default()).unwrap();
        assert_eq!(client.config().model, "mistral");
    }
}
