//! Conversion of raw RFC 5322 bytes into the provider part-tree shape

use crate::error::{ParseError, Result};
use crate::parser::encode_payload;
use crate::types::{Header, MessagePart, PartBody, RawMessage};
use mailparse::{DispositionType, MailHeaderMap, ParsedMail};
use tracing::debug;

impl RawMessage {
    /// Build a message from raw RFC 5322 bytes
    ///
    /// Leaf bodies are transfer-decoded and re-encoded as base64 payloads.
    /// Attachments carry their `Content-ID` as reference, or a positional
    /// `part-<id>` reference when they have none. The root part has no id
    /// and falls back to `part-root`.
    pub fn from_rfc822(raw: &[u8]) -> Result<Self> {
        let parsed = mailparse::parse_mail(raw).map_err(|e| ParseError::Structure(e.to_string()))?;
        let id = parsed
            .headers
            .get_first_value("Message-ID")
            .map(|v| v.trim().to_string());

        let payload = convert_part(&parsed, None)?;
        debug!(
            headers = payload.headers.len(),
            multipart = payload.parts.is_some(),
            "Converted RFC 5322 message"
        );

        Ok(Self { id, payload })
    }
}

fn convert_part(parsed: &ParsedMail, part_id: Option<String>) -> Result<MessagePart> {
    let headers: Vec<Header> = parsed
        .headers
        .iter()
        .map(|h| Header::new(h.get_key(), h.get_value()))
        .collect();
    let mime_type = parsed.ctype.mimetype.to_lowercase();

    if !parsed.subparts.is_empty() {
        let parts = parsed
            .subparts
            .iter()
            .enumerate()
            .map(|(i, sub)| {
                let child_id = part_id
                    .as_ref()
                    .map_or_else(|| i.to_string(), |parent| format!("{parent}.{i}"));
                convert_part(sub, Some(child_id))
            })
            .collect::<Result<Vec<_>>>()?;

        return Ok(MessagePart {
            part_id,
            mime_type,
            headers,
            parts: Some(parts),
            ..MessagePart::default()
        });
    }

    let disposition = parsed.get_content_disposition();
    let filename = disposition
        .params
        .get("filename")
        .or_else(|| parsed.ctype.params.get("name"))
        .cloned()
        .unwrap_or_default();

    let is_attachment = matches!(disposition.disposition, DispositionType::Attachment);
    let body = if filename.is_empty() && !is_attachment {
        let bytes = if mime_type.starts_with("text/") {
            parsed
                .get_body()
                .map_err(|e| ParseError::Decode(e.to_string()))?
                .into_bytes()
        } else {
            parsed
                .get_body_raw()
                .map_err(|e| ParseError::Decode(e.to_string()))?
        };
        PartBody {
            size: Some(bytes.len() as u64),
            data: Some(encode_payload(&bytes)),
            ..PartBody::default()
        }
    } else {
        let attachment_id = parsed
            .headers
            .get_first_value("Content-ID")
            .map(|v| v.trim().trim_matches(['<', '>']).to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| format!("part-{}", part_id.as_deref().unwrap_or("root")));
        PartBody {
            attachment_id: Some(attachment_id),
            ..PartBody::default()
        }
    };

    Ok(MessagePart {
        part_id,
        mime_type,
        filename,
        headers,
        body: Some(body),
        parts: None,
    })
}
