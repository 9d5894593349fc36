//! Output formats layered on the resolved payload.
//!
//! Every format renders the same resolved-or-fallback [`MediaData`]; what
//! differs is the envelope. The format set is closed: adding one means
//! adding a variant here and a rendering arm in the media routes, and the
//! compiler points at every match that needs extending.

mod document;
mod oembed;
mod script;

pub use document::{build_document, failure_document};
pub use oembed::oembed_envelope;
pub use script::{embed_tag, script_body};

use unfurl_core::MediaData;

/// The supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    /// Structured JSON envelope.
    Data,
    /// JavaScript embedding snippet.
    Script,
    /// Static HTML document.
    Document,
    /// oEmbed JSON envelope.
    Oembed,
}

impl MediaFormat {
    /// Parse a `format` query value. Unknown values are `None` so the caller
    /// can fall through to header negotiation.
    pub fn from_query(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "json" | "data" => Some(MediaFormat::Data),
            "js" | "script" => Some(MediaFormat::Script),
            "html" | "document" => Some(MediaFormat::Document),
            "oembed" => Some(MediaFormat::Oembed),
            _ => None,
        }
    }

    /// Pick the format for a request.
    ///
    /// An explicit `format` query value wins over the `Accept` header.
    /// Within the header, more specific media types are checked first
    /// ("application/json+oembed" would otherwise be swallowed by the
    /// "application/json" test). Anything unrecognized gets [`Data`].
    ///
    /// [`Data`]: MediaFormat::Data
    pub fn negotiate(accept: Option<&str>, query: Option<&str>) -> Self {
        if let Some(format) = query.and_then(Self::from_query) {
            return format;
        }

        let accept = match accept {
            Some(value) => value,
            None => return MediaFormat::Data,
        };

        if accept.contains("application/json+oembed") {
            MediaFormat::Oembed
        } else if accept.contains("application/javascript") || accept.contains("text/javascript") {
            MediaFormat::Script
        } else if accept.contains("text/html") {
            MediaFormat::Document
        } else {
            MediaFormat::Data
        }
    }

    /// The Content-Type this format is served with.
    pub fn content_type(&self) -> &'static str {
        match self {
            MediaFormat::Data | MediaFormat::Oembed => "application/json",
            MediaFormat::Script => "application/javascript",
            MediaFormat::Document => "text/html; charset=utf-8",
        }
    }
}

/// The structured-data envelope: `{"type": "media", "data": {...}}`.
///
/// The payload is serialized as-is (including any embedded error
/// descriptor) with the embed tag appended alongside its fields.
pub fn media_envelope(media: &MediaData, embed_tag: &str) -> serde_json::Value {
    let mut data = match serde_json::to_value(media) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    data.insert(
        "embed_tag".to_string(),
        serde_json::Value::String(embed_tag.to_string()),
    );

    serde_json::json!({
        "type": "media",
        "data": data,
    })
}

/// Envelope for request-shaped failures that still render a JSON body.
pub fn error_envelope(message: &str, code: &str, retry_in: Option<u64>) -> serde_json::Value {
    let mut data = serde_json::Map::new();
    data.insert("message".to_string(), serde_json::json!(message));
    data.insert("code".to_string(), serde_json::json!(code));
    if let Some(seconds) = retry_in {
        data.insert("retry_in".to_string(), serde_json::json!(seconds));
    }

    serde_json::json!({
        "type": "error",
        "data": data,
    })
}
