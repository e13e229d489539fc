//! Concurrent classification and summarization of parsed messages
//!
//! Each message runs its classifier and summarizer side by side. A batch
//! runs up to [`EnrichConfig::max_concurrency`] messages at once and always
//! yields one result per input, in input order. Failures stay with the
//! message that caused them.

use crate::config::EnrichConfig;
use crate::error::EnrichError;
use crate::parser::parse_message;
use crate::types::{
    Classification, EnrichedEmail, EnrichmentResult, ErrorInfo, ParsedEmail, RawMessage,
};
use async_trait::async_trait;
use futures::future::try_join;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Derives a classification from a message body
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, body: &str) -> Result<Classification, EnrichError>;
}

/// Derives a short summary from a message body
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, body: &str) -> Result<String, EnrichError>;
}

#[async_trait]
impl<T: Classifier + ?Sized> Classifier for Arc<T> {
    async fn classify(&self, body: &str) -> Result<Classification, EnrichError> {
        (**self).classify(body).await
    }
}

#[async_trait]
impl<T: Summarizer + ?Sized> Summarizer for Arc<T> {
    async fn summarize(&self, body: &str) -> Result<String, EnrichError> {
        (**self).summarize(body).await
    }
}

/// Fans every message out to a classifier and a summarizer
pub struct Orchestrator<C, S> {
    classifier: C,
    summarizer: S,
    config: EnrichConfig,
}

impl<C: Classifier, S: Summarizer> Orchestrator<C, S> {
    pub fn new(classifier: C, summarizer: S) -> Self {
        Self::with_config(classifier, summarizer, EnrichConfig::default())
    }

    pub const fn with_config(classifier: C, summarizer: S, config: EnrichConfig) -> Self {
        Self {
            classifier,
            summarizer,
            config,
        }
    }

    pub const fn config(&self) -> &EnrichConfig {
        &self.config
    }

    /// Classify and summarize one message concurrently
    ///
    /// The first failing call decides the outcome; no partial result is kept
    pub async fn enrich(&self, email: &ParsedEmail) -> EnrichmentResult {
        let timeout = self.config.call_timeout;
        let classify = with_timeout(timeout, self.classifier.classify(&email.body));
        let summarize = with_timeout(timeout, self.summarizer.summarize(&email.body));

        match try_join(classify, summarize).await {
            Ok((classification, summary)) => {
                debug!(
                    subject = email.subject.as_str(),
                    category = %classification.category,
                    priority = %classification.priority,
                    "Message enriched"
                );
                EnrichmentResult::Enriched {
                    classification,
                    summary,
                }
            }
            Err(e) => {
                warn!(
                    subject = email.subject.as_str(),
                    error = %e,
                    "Error during processing email"
                );
                EnrichmentResult::Failed {
                    error: ErrorInfo::new(email.subject.clone(), e.to_string()),
                }
            }
        }
    }

    /// Enrich a batch, one result per message in input order
    pub async fn enrich_batch(&self, emails: &[ParsedEmail]) -> Vec<EnrichmentResult> {
        let limit = self.config.max_concurrency.max(1);

        let results: Vec<EnrichmentResult> = stream::iter(emails)
            .map(|email| self.enrich(email))
            .buffered(limit)
            .collect()
            .await;

        let failed = results.iter().filter(|r| !r.is_enriched()).count();
        info!(
            total = results.len(),
            failed,
            max_concurrency = limit,
            "Batch enrichment complete"
        );

        results
    }

    /// Parse and enrich raw messages into output records, in input order
    pub async fn process_batch(&self, messages: &[RawMessage]) -> Vec<EnrichedEmail> {
        let parsed: Vec<ParsedEmail> = messages.iter().map(parse_message).collect();
        let results = self.enrich_batch(&parsed).await;

        parsed
            .into_iter()
            .zip(results)
            .map(|(email, result)| {
                match &result {
                    EnrichmentResult::Enriched {
                        classification,
                        summary,
                    } => info!(
                        from = email.from.as_str(),
                        subject = email.subject.as_str(),
                        summary = summary.as_str(),
                        classification = %classification,
                        "Processed email"
                    ),
                    EnrichmentResult::Failed { error } => warn!(
                        from = email.from.as_str(),
                        subject = email.subject.as_str(),
                        error = error.message.as_str(),
                        "Email left unenriched"
                    ),
                }
                EnrichedEmail::new(email, result)
            })
            .collect()
    }
}

async fn with_timeout<T, F>(limit: Option<Duration>, call: F) -> Result<T, EnrichError>
where
    F: Future<Output = Result<T, EnrichError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| EnrichError::Timeout(limit))?,
        None => call.await,
    }
}
