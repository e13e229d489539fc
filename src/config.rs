//! Configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Batch enrichment configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    /// Maximum number of messages enriched at the same time
    pub max_concurrency: usize,
    /// Limit for a single classifier or summarizer call
    pub call_timeout: Option<Duration>,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            call_timeout: None,
        }
    }
}

impl EnrichConfig {
    #[must_use]
    pub const fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    #[must_use]
    pub const fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }
}

/// Connection settings for a local Ollama server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
    pub temperature: f32,
    /// HTTP timeout for one generate request
    pub request_timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "mistral".to_string(),
            temperature: 0.2,
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl OllamaConfig {
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}
