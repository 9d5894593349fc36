//! The media payload model shared by every output format.
//!
//! [`MediaData`] is what a resolution produces, what the cache stores, and
//! what every renderer shapes into its own envelope. Fields that a given
//! page did not yield stay `None` and are skipped during serialization, so
//! cached payloads from sparse pages stay small.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured metadata resolved from a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaData {
    /// The URL this payload was resolved from, exactly as requested.
    pub url: String,

    /// Kind of media ("item", "video", "article", ...).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Provider-supplied embeddable markup, when the page offers one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_url: Option<String>,

    /// When the resolution that produced this payload completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_at: Option<DateTime<Utc>>,

    /// Provider-specific fields that have no dedicated slot.
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,

    /// Error descriptor attached to fallback and failure payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<MediaError>,
}

impl MediaData {
    /// The safety-net payload: only the original URL is known.
    pub fn minimal(url: &str) -> Self {
        Self {
            url: url.to_string(),
            media_type: None,
            title: None,
            description: None,
            html: None,
            thumbnail_url: None,
            author_name: None,
            author_url: None,
            provider_name: None,
            provider_url: None,
            parsed_at: None,
            extra: BTreeMap::new(),
            error: None,
        }
    }

    /// Attach an error descriptor, consuming and returning the payload.
    pub fn with_error(mut self, error: MediaError) -> Self {
        self.error = Some(error);
        self
    }
}

/// Error descriptor embedded in payloads that still render with status 200.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaError {
    pub message: String,
    pub code: String,
}

impl MediaError {
    /// The descriptor written into timeout fallback payloads.
    pub fn timeout() -> Self {
        Self {
            message: "Timeout".to_string(),
            code: "TIMEOUT".to_string(),
        }
    }

    /// Descriptor for resolution failures with no more specific handling.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: "UNKNOWN".to_string(),
        }
    }
}
