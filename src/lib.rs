// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::significant_drop_tightening)]

//! Mail enrichment
//!
//! Turns provider mail messages into clean, enriched records: a plain-text
//! body flattened from the MIME tree and any embedded HTML, a classification
//! and a short summary.
//!
//! # Features
//!
//! - Depth-first MIME part walk with attachment collection
//! - Embedded HTML detection and sanitization, leaving surrounding text intact
//! - Classifier and summarizer run concurrently per message
//! - Bounded, order-preserving batch enrichment with per-message failures
//! - Ollama-backed enrichers and RFC 5322 input
//!
//! # Example
//!
//! ```rust
//! use mail_enrich::{MessagePart, RawMessage, parse_message};
//!
//! // "Apply now!" base64 encoded
//! let raw = RawMessage::new(MessagePart::multipart(
//!     "multipart/alternative",
//!     vec![MessagePart::leaf("text/plain", "QXBwbHkgbm93IQ")],
//! ))
//! .with_header("Subject", "Apply now to the Google Summer Internship");
//!
//! let email = parse_message(&raw);
//! assert_eq!(email.body, "Apply now!");
//! assert_eq!(email.from, "(no sender)");
//! ```

mod config;
mod enrich;
mod error;
mod html;
mod ollama;
mod parser;
mod rfc822;
mod types;

pub use config::{EnrichConfig, OllamaConfig};
pub use enrich::{Classifier, Orchestrator, Summarizer};
pub use error::{EnrichError, ParseError, Result};
pub use html::{compose_body, locate_html, normalize_whitespace, sanitize_html};
pub use ollama::OllamaClient;
pub use parser::{decode_payload, encode_payload, parse_message, walk_parts};
pub use types::*;
