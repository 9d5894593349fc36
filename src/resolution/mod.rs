//! Deadline-bounded resolution over the payload cache.
//!
//! [`ResolutionService`] decides, per request, between three outcomes:
//! returning a cached payload untouched, performing a fresh resolution under
//! a wall-clock deadline, or serving a timeout fallback when the resolver
//! exceeds its budget. Fallbacks and fresh results are written back to the
//! cache under the request fingerprint, so the repeat request for a slow URL
//! is a cache hit instead of another deadline wait.
//!
//! A resolution attempt that outlives its deadline is abandoned, not
//! cancelled: the spawned task keeps running and its eventual result is
//! discarded. A resolver is never interrupted mid-flight.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use unfurl_core::{Fingerprint, MediaData, MediaError};

use crate::cache::CacheStore;
use crate::resolver::{MediaResolver, ResolveError};

/// Where a resolution's payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Served from the cache; no resolver involved.
    Cache,
    /// Freshly resolved within the deadline.
    Fresh,
    /// The deadline fired; this is the fallback payload.
    Fallback,
}

/// A resolved payload together with its provenance.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub media: MediaData,
    pub source: ResolutionSource,
}

/// Orchestrates cache reads, deadline-bounded resolution, and fallback
/// writes for a single resolver backend.
pub struct ResolutionService {
    resolver: Arc<dyn MediaResolver>,
    cache: Arc<dyn CacheStore>,
    deadline: Duration,
}

impl ResolutionService {
    /// Create a new service with the given resolver, cache, and per-attempt
    /// wall-clock budget.
    pub fn new(
        resolver: Arc<dyn MediaResolver>,
        cache: Arc<dyn CacheStore>,
        deadline: Duration,
    ) -> Self {
        Self {
            resolver,
            cache,
            deadline,
        }
    }

    /// The per-attempt wall-clock budget.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// The resolver's safety-net payload for `url`.
    pub fn minimal_data(&self, url: &str) -> MediaData {
        self.resolver.minimal_data(url)
    }

    /// Resolve `url`, deriving the cache key from the URL string.
    pub async fn resolve(&self, url: &str, refresh: bool) -> Result<Resolution, ResolveError> {
        let fingerprint = Fingerprint::of_url(url);
        self.resolve_keyed(&fingerprint, url, refresh).await
    }

    /// Resolve `url` under an explicit cache key.
    ///
    /// With `refresh` unset, a cached payload is returned exactly as stored;
    /// a payload cached by an earlier timeout keeps its error descriptor and
    /// does not get a second one. With `refresh` set, the cache read is
    /// skipped and the attempt proceeds as if the entry did not exist.
    pub async fn resolve_keyed(
        &self,
        fingerprint: &Fingerprint,
        url: &str,
        refresh: bool,
    ) -> Result<Resolution, ResolveError> {
        if !refresh {
            if let Some(media) = self.cache.read(fingerprint).await {
                debug!(fingerprint = %fingerprint, "cache hit");
                return Ok(Resolution {
                    media,
                    source: ResolutionSource::Cache,
                });
            }
        }

        if !self.resolver.validate_url(url) {
            return Err(ResolveError::InvalidUrl(url.to_string()));
        }

        let resolver = Arc::clone(&self.resolver);
        let target = url.to_string();
        let mut attempt = tokio::spawn(async move { resolver.resolve(&target).await });

        match tokio::time::timeout(self.deadline, &mut attempt).await {
            Ok(joined) => {
                let media = match joined {
                    Ok(Ok(media)) => media,
                    Ok(Err(e)) => return Err(e),
                    Err(e) => {
                        return Err(ResolveError::Failed(format!("resolver task failed: {e}")))
                    }
                };

                self.cache.write(fingerprint, &media).await;
                debug!(fingerprint = %fingerprint, resolver = self.resolver.name(), "resolved fresh");
                Ok(Resolution {
                    media,
                    source: ResolutionSource::Fresh,
                })
            }
            Err(_) => {
                warn!(
                    url = %url,
                    deadline = ?self.deadline,
                    "resolution exceeded deadline, serving fallback"
                );

                // Best effort: the attempt may have finished in the gap
                // between the deadline firing and us getting here. Otherwise
                // drop the handle and let the task run itself out detached.
                let media = if attempt.is_finished() {
                    match attempt.await {
                        Ok(Ok(media)) => media,
                        _ => self.resolver.minimal_data(url),
                    }
                } else {
                    drop(attempt);
                    self.resolver.minimal_data(url)
                };

                let media = media.with_error(MediaError::timeout());
                self.cache.write(fingerprint, &media).await;
                Ok(Resolution {
                    media,
                    source: ResolutionSource::Fallback,
                })
            }
        }
    }
}
