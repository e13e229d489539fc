//! Core types for raw messages, parsed emails and enrichment output

use crate::error::EnrichError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A message as delivered by the mail provider
///
/// Mirrors the Gmail `users.messages.get` (`format=full`) payload, so a
/// provider response can be deserialized straight into it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    /// Provider message id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Root of the part tree, carrying the message headers
    #[serde(default)]
    pub payload: MessagePart,
}

impl RawMessage {
    #[must_use]
    pub const fn new(payload: MessagePart) -> Self {
        Self { id: None, payload }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Append a header to the root part
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.headers.push(Header::new(name, value));
        self
    }

    /// Value of the first header whose name matches exactly
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload
            .headers
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.value.as_str())
    }
}

/// A header name/value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A node in the MIME part tree
///
/// A node with `parts` is a container; any other node is a leaf carrying
/// either an encoded body payload or a filename plus attachment reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,

    /// MIME type, e.g. `text/plain` or `multipart/alternative`
    #[serde(default)]
    pub mime_type: String,

    /// Attachment filename, empty for inline content
    #[serde(default)]
    pub filename: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Header>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<PartBody>,

    /// Child parts; present (possibly empty) only on containers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<MessagePart>>,
}

impl MessagePart {
    /// Leaf with an already-encoded body payload
    pub fn leaf(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            body: Some(PartBody {
                data: Some(data.into()),
                ..PartBody::default()
            }),
            ..Self::default()
        }
    }

    /// Leaf referencing an attachment that is not fetched
    pub fn attachment(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        attachment_id: impl Into<String>,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            filename: filename.into(),
            body: Some(PartBody {
                attachment_id: Some(attachment_id.into()),
                ..PartBody::default()
            }),
            ..Self::default()
        }
    }

    /// Container node
    pub fn multipart(mime_type: impl Into<String>, parts: Vec<Self>) -> Self {
        Self {
            mime_type: mime_type.into(),
            parts: Some(parts),
            ..Self::default()
        }
    }

    /// Encoded payload, if present and non-empty
    #[must_use]
    pub fn data(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.data.as_deref())
            .filter(|d| !d.is_empty())
    }

    /// Attachment reference, if present and non-empty
    #[must_use]
    pub fn attachment_id(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.attachment_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// Body of a part: inline data or a reference to fetch it later
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Base64 (standard or URL-safe) encoded content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// A message reduced to sender, subject, clean text body and attachments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEmail {
    pub from: String,
    pub subject: String,

    /// Decoded text; an embedded HTML document is replaced by its text
    pub body: String,

    /// Attachments in depth-first document order
    pub attachments: Vec<Attachment>,
}

/// Identifies an attachment without its content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub filename: String,
    pub mime_type: String,
    pub attachment_id: String,
}

/// Message category assigned by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Spam,
    News,
    Social,
    Opportunities,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spam => "spam",
            Self::News => "news",
            Self::Social => "social",
            Self::Opportunities => "opportunities",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority assigned by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured classifier output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "type")]
    pub category: Category,
    pub priority: Priority,
    pub reason: String,
}

impl Classification {
    pub fn new(category: Category, priority: Priority, reason: impl Into<String>) -> Self {
        Self {
            category,
            priority,
            reason: reason.into(),
        }
    }

    /// Validate a structured value returned by a classifier
    ///
    /// Unknown `type` or `priority` values and missing fields are rejected.
    pub fn from_json(value: serde_json::Value) -> Result<Self, EnrichError> {
        serde_json::from_value(value).map_err(|e| EnrichError::InvalidClassification(e.to_string()))
    }

    /// Validate a JSON document returned by a classifier
    pub fn from_json_str(raw: &str) -> Result<Self, EnrichError> {
        let value: serde_json::Value = serde_json::from_str(raw.trim())
            .map_err(|e| EnrichError::MalformedResponse(e.to_string()))?;
        Self::from_json(value)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: {}", self.category, self.priority, self.reason)
    }
}

/// Why a message could not be enriched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Subject of the failed message
    pub subject: String,

    /// Description of the underlying error
    pub message: String,
}

impl ErrorInfo {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error during processing email: {}: {}",
            self.subject, self.message
        )
    }
}

/// Outcome of enriching one message: both enrichments, or an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnrichmentResult {
    Enriched {
        classification: Classification,
        summary: String,
    },
    Failed {
        error: ErrorInfo,
    },
}

impl EnrichmentResult {
    #[must_use]
    pub const fn is_enriched(&self) -> bool {
        matches!(self, Self::Enriched { .. })
    }

    #[must_use]
    pub const fn classification(&self) -> Option<&Classification> {
        match self {
            Self::Enriched { classification, .. } => Some(classification),
            Self::Failed { .. } => None,
        }
    }

    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        match self {
            Self::Enriched { summary, .. } => Some(summary),
            Self::Failed { .. } => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Enriched { .. } => None,
            Self::Failed { error } => Some(error),
        }
    }
}

/// Final output record for one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedEmail {
    pub from: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Attachment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl EnrichedEmail {
    /// Attach an enrichment outcome to its parsed message
    #[must_use]
    pub fn new(email: ParsedEmail, result: EnrichmentResult) -> Self {
        let (classification, summary, error) = match result {
            EnrichmentResult::Enriched {
                classification,
                summary,
            } => (Some(classification), Some(summary), None),
            EnrichmentResult::Failed { error } => (None, None, Some(error)),
        };

        Self {
            from: email.from,
            subject: email.subject,
            body: email.body,
            attachments: email.attachments,
            classification,
            summary,
            error,
        }
    }
}
