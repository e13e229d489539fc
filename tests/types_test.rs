use mail_enrich::*;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

// --- Classification ---

#[test]
fn test_classification_from_json() {
    let value = serde_json::json!({
        "type": "opportunities",
        "priority": "high",
        "reason": "Internship at a well-known company"
    });

    let classification = assert_ok!(Classification::from_json(value));
    assert_eq!(classification.category, Category::Opportunities);
    assert_eq!(classification.priority, Priority::High);
    assert_eq!(classification.reason, "Internship at a well-known company");
}

#[test]
fn test_classification_rejects_unknown_type() {
    let value = serde_json::json!({ "type": "promotions", "priority": "low", "reason": "x" });

    let err = assert_err!(Classification::from_json(value));
    assert!(matches!(err, EnrichError::InvalidClassification(_)));
}

#[test]
fn test_classification_rejects_unknown_priority() {
    let value = serde_json::json!({ "type": "spam", "priority": "urgent", "reason": "x" });

    assert_err!(Classification::from_json(value));
}

#[test]
fn test_classification_rejects_missing_reason() {
    let value = serde_json::json!({ "type": "spam", "priority": "low" });

    assert_err!(Classification::from_json(value));
}

#[test]
fn test_classification_rejects_wrong_shape() {
    assert_err!(Classification::from_json(serde_json::json!(["spam", "low"])));
}

#[test]
fn test_classification_from_json_str() {
    let raw = "\n{\"type\":\"news\",\"priority\":\"medium\",\"reason\":\"Daily digest\"}\n";

    let classification = assert_ok!(Classification::from_json_str(raw));
    assert_eq!(classification.category, Category::News);
    assert_eq!(classification.priority, Priority::Medium);
}

#[test]
fn test_classification_from_malformed_str() {
    let err = assert_err!(Classification::from_json_str("Type: spam"));
    assert!(matches!(err, EnrichError::MalformedResponse(_)));
}

#[test]
fn test_classification_serializes_type_key() {
    let classification = Classification::new(Category::Social, Priority::Low, "Friend");
    let json = serde_json::to_value(&classification).unwrap();

    assert_eq!(
        json,
        serde_json::json!({ "type": "social", "priority": "low", "reason": "Friend" })
    );
}

#[test]
fn test_classification_display() {
    let classification = Classification::new(Category::Spam, Priority::Low, "Prize scam");
    assert_eq!(classification.to_string(), "spam/low: Prize scam");
}

// --- EnrichmentResult / EnrichedEmail ---

fn parsed() -> ParsedEmail {
    ParsedEmail {
        from: "a@example.com".into(),
        subject: "Hello".into(),
        body: "Body".into(),
        attachments: Vec::new(),
    }
}

#[test]
fn test_enriched_result_accessors() {
    let result = EnrichmentResult::Enriched {
        classification: Classification::new(Category::News, Priority::Medium, "r"),
        summary: "Short".into(),
    };

    assert!(result.is_enriched());
    assert_eq!(result.summary(), Some("Short"));
    assert_eq!(result.classification().unwrap().category, Category::News);
    assert!(result.error().is_none());
}

#[test]
fn test_failed_result_accessors() {
    let result = EnrichmentResult::Failed {
        error: ErrorInfo::new("Hello", "boom"),
    };

    assert!(!result.is_enriched());
    assert!(result.summary().is_none());
    assert!(result.classification().is_none());
    assert_eq!(result.error().unwrap().message, "boom");
}

#[test]
fn test_error_info_display() {
    let error = ErrorInfo::new("Weekly report", "Enricher transport failed: refused");
    assert_eq!(
        error.to_string(),
        "Error during processing email: Weekly report: Enricher transport failed: refused"
    );
}

#[test]
fn test_enriched_email_success_record() {
    let record = EnrichedEmail::new(
        parsed(),
        EnrichmentResult::Enriched {
            classification: Classification::new(Category::Social, Priority::Low, "r"),
            summary: "S".into(),
        },
    );
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(record.subject, "Hello");
    assert_eq!(json["summary"], "S");
    assert_eq!(json["classification"]["type"], "social");
    assert!(json.get("error").is_none());
}

#[test]
fn test_enriched_email_failure_record() {
    let record = EnrichedEmail::new(
        parsed(),
        EnrichmentResult::Failed {
            error: ErrorInfo::new("Hello", "boom"),
        },
    );
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["body"], "Body");
    assert_eq!(json["error"]["subject"], "Hello");
    assert!(json.get("classification").is_none());
    assert!(json.get("summary").is_none());
}

// --- RawMessage ---

#[test]
fn test_raw_message_header_lookup() {
    let raw = RawMessage::default()
        .with_id("m1")
        .with_header("Subject", "First")
        .with_header("Subject", "Second");

    assert_eq!(raw.id.as_deref(), Some("m1"));
    assert_eq!(raw.header("Subject"), Some("First"));
    assert_eq!(raw.header("subject"), None);
}

#[test]
fn test_message_part_accessors() {
    let leaf = MessagePart::leaf("text/plain", "");
    let attachment = MessagePart::attachment("a.txt", "text/plain", "id-1");

    assert!(leaf.data().is_none());
    assert_eq!(attachment.attachment_id(), Some("id-1"));
    assert!(attachment.data().is_none());
}

// --- Category / Priority ---

#[test]
fn test_category_and_priority_display() {
    assert_eq!(Category::Opportunities.to_string(), "opportunities");
    assert_eq!(Category::Spam.as_str(), "spam");
    assert_eq!(Priority::Medium.to_string(), "medium");
}

// --- Config ---

#[test]
fn test_enrich_config_defaults() {
    let config = EnrichConfig::default();
    assert_eq!(config.max_concurrency, 8);
    assert!(config.call_timeout.is_none());

    let config = config
        .with_max_concurrency(2)
        .with_call_timeout(Duration::from_secs(5));
    assert_eq!(config.max_concurrency, 2);
    assert_eq!(config.call_timeout, Some(Duration::from_secs(5)));
}

#[test]
fn test_enrich_config_partial_json() {
    let config: EnrichConfig = serde_json::from_str(r#"{ "max_concurrency": 3 }"#).unwrap();

    assert_eq!(config.max_concurrency, 3);
    assert!(config.call_timeout.is_none());
}

#[test]
fn test_ollama_config_defaults() {
    let config = OllamaConfig::default()
        .with_model("llama3")
        .with_url("http://ollama:11434");

    assert_eq!(config.model, "llama3");
    assert_eq!(config.url, "http://ollama:11434");
    assert!((config.temperature - 0.2).abs() < f32::EPSILON);
}

#[test]
fn test_ollama_config_request_timeout() {
    let config = OllamaConfig::default();
    assert_eq!(config.request_timeout, Duration::from_secs(60));

    let config = config.with_request_timeout(Duration::from_secs(5));
    assert_eq!(config.request_timeout, Duration::from_secs(5));
}
