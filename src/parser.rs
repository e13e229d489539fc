//! Message parser: part-tree walk, payload decoding and body composition

use crate::html::compose_body;
use crate::types::{Attachment, MessagePart, ParsedEmail, RawMessage};
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use tracing::{debug, warn};

const NO_SENDER: &str = "(no sender)";
const NO_SUBJECT: &str = "(no subject)";

/// URL-safe decoder; standard-alphabet input is mapped onto it first.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Parse a provider message into sender, subject, clean body and attachments
///
/// Missing headers fall back to `(no sender)` / `(no subject)` and missing
/// part data to an empty body; this never fails.
#[must_use]
pub fn parse_message(raw: &RawMessage) -> ParsedEmail {
    let from = raw.header("From").unwrap_or(NO_SENDER).to_string();
    let subject = raw.header("Subject").unwrap_or(NO_SUBJECT).to_string();

    let (body, attachments) = match &raw.payload.parts {
        Some(parts) => walk_parts(parts),
        None => (
            raw.payload
                .data()
                .and_then(decode_payload)
                .unwrap_or_default(),
            Vec::new(),
        ),
    };

    let body = compose_body(&body);

    debug!(
        from = from.as_str(),
        subject = subject.as_str(),
        body_len = body.len(),
        attachments = attachments.len(),
        "Parsed message"
    );

    ParsedEmail {
        from,
        subject,
        body,
        attachments,
    }
}

/// Collect text/plain bodies and attachment references from a part list
///
/// Depth-first and left to right; both outputs keep document order.
#[must_use]
pub fn walk_parts(parts: &[MessagePart]) -> (String, Vec<Attachment>) {
    let mut body = String::new();
    let mut attachments = Vec::new();
    let mut stack: Vec<&MessagePart> = parts.iter().rev().collect();

    while let Some(part) = stack.pop() {
        if let Some(children) = &part.parts {
            stack.extend(children.iter().rev());
        } else if part.mime_type == "text/plain"
            && let Some(data) = part.data()
        {
            if let Some(text) = decode_payload(data) {
                body.push_str(&text);
            }
        } else if !part.filename.is_empty()
            && let Some(attachment_id) = part.attachment_id()
        {
            attachments.push(Attachment {
                filename: part.filename.clone(),
                mime_type: part.mime_type.clone(),
                attachment_id: attachment_id.to_string(),
            });
        }
    }

    (body, attachments)
}

/// Decode a base64 payload (standard or URL-safe, padding optional) as UTF-8
///
/// Invalid UTF-8 sequences are replaced; undecodable payloads yield `None`.
#[must_use]
pub fn decode_payload(data: &str) -> Option<String> {
    let normalized: String = data
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    match PAYLOAD_ENGINE.decode(normalized.trim_end_matches('=')) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            warn!(error = %e, "Skipping undecodable part payload");
            None
        }
    }
}

/// Encode bytes the way providers ship part payloads
#[must_use]
pub fn encode_payload(bytes: &[u8]) -> String {
    PAYLOAD_ENGINE.encode(bytes)
}
