//! Trait definition and error type for media resolvers.
//!
//! This module defines the [`MediaResolver`] trait that metadata extraction
//! backends implement. The service treats a resolver as an unbounded,
//! non-preemptible operation; deadline enforcement lives in
//! [`crate::resolution`], not here.

mod page;

pub use page::PageResolver;

use async_trait::async_trait;
use unfurl_core::MediaData;

/// Failure modes a resolver can report.
///
/// There is no timeout variant: a resolver never observes its own deadline.
/// The orchestrator abandons slow attempts from the outside.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The URL cannot be resolved by any backend (bad scheme, no host, ...).
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The local request budget is exhausted.
    #[error("rate limit exceeded, retry in {reset_in}s")]
    RateLimited {
        /// Seconds until the next request slot opens.
        reset_in: u64,
    },

    /// Anything else: network failures, unparseable pages, upstream errors.
    #[error("resolution failed: {0}")]
    Failed(String),
}

/// Async trait for URL-to-metadata resolution backends.
///
/// Implementations are expected to be wrapped in an `Arc` so they can be
/// shared across tasks. A `resolve` call may take arbitrarily long and must
/// tolerate its result being discarded when the caller has given up.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Short, lowercase identifier for this resolver (e.g. `"page"`).
    fn name(&self) -> &'static str;

    /// Syntactic check, run before any resolution work is scheduled.
    fn validate_url(&self, url: &str) -> bool {
        match reqwest::Url::parse(url) {
            Ok(parsed) => {
                matches!(parsed.scheme(), "http" | "https") && parsed.has_host()
            }
            Err(_) => false,
        }
    }

    /// The payload to fall back to when nothing was resolved.
    fn minimal_data(&self, url: &str) -> MediaData {
        MediaData::minimal(url)
    }

    /// Resolve `url` into structured metadata.
    async fn resolve(&self, url: &str) -> Result<MediaData, ResolveError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DefaultsOnly;

    #[async_trait]
    impl MediaResolver for DefaultsOnly {
        fn name(&self) -> &'static str {
            "defaults"
        }

        async fn resolve(&self, url: &str) -> Result<MediaData, ResolveError> {
            Ok(MediaData::minimal(url))
        }
    }

    #[test]
    fn default_validation_accepts_http_and_https() {
        let r = DefaultsOnly;
        assert!(r.validate_url("http://example.com/a"));
        assert!(r.validate_url("https://example.com/a?x=1"));
    }

    #[test]
    fn default_validation_rejects_garbage() {
        let r = DefaultsOnly;
        assert!(!r.validate_url("not a url"));
        assert!(!r.validate_url("ftp://example.com/file"));
        assert!(!r.validate_url("javascript:alert(1)"));
        assert!(!r.validate_url(""));
    }

    #[test]
    fn default_minimal_data_is_url_only() {
        let r = DefaultsOnly;
        let media = r.minimal_data("https://example.com");
        assert_eq!(media.url, "https://example.com");
        assert!(media.title.is_none());
    }
}
