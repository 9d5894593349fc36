//! Lightweight service counters, surfaced by the health endpoint.

use parking_lot::RwLock;
use serde::Serialize;

use crate::resolution::ResolutionSource;

/// Process-wide request counters.
#[derive(Debug, Default)]
pub struct ServiceStats {
    inner: RwLock<StatsSnapshot>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub fresh_resolutions: u64,
    pub timeout_fallbacks: u64,
    pub errors: u64,
}

impl ServiceStats {
    pub fn record_resolution(&self, source: ResolutionSource) {
        let mut stats = self.inner.write();
        stats.total_requests += 1;
        match source {
            ResolutionSource::Cache => stats.cache_hits += 1,
            ResolutionSource::Fresh => stats.fresh_resolutions += 1,
            ResolutionSource::Fallback => stats.timeout_fallbacks += 1,
        }
    }

    pub fn record_error(&self) {
        let mut stats = self.inner.write();
        stats.total_requests += 1;
        stats.errors += 1;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.inner.read().clone()
    }
}

impl StatsSnapshot {
    pub fn cache_hit_rate(&self) -> f32 {
        if self.total_requests == 0 {
            return 0.0;
        }
        (self.cache_hits as f32 / self.total_requests as f32) * 100.0
    }
}
