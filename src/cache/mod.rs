//! Payload cache: fingerprint-keyed storage of resolved media.
//!
//! The cache is an explicit read/write key-value store. No TTL or eviction
//! happens at this layer; entries are overwritten by fresh resolutions and
//! timeout fallbacks, and a forced refresh bypasses the read side entirely.

mod artifacts;

pub use artifacts::ArtifactStore;

use async_trait::async_trait;
use dashmap::DashMap;
use unfurl_core::{Fingerprint, MediaData};

/// Key-value store mapping request fingerprints to resolved payloads.
///
/// Concurrent writers for the same fingerprint race; the last write wins.
/// Implementations need no per-key locking.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up the payload cached for `key`, if any.
    async fn read(&self, key: &Fingerprint) -> Option<MediaData>;

    /// Store `data` under `key`, replacing any previous entry.
    async fn write(&self, key: &Fingerprint, data: &MediaData);

    /// Number of cached entries, for health reporting.
    async fn len(&self) -> usize;
}

/// In-process reference store backed by a concurrent map.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<Fingerprint, MediaData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn read(&self, key: &Fingerprint) -> Option<MediaData> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    async fn write(&self, key: &Fingerprint, data: &MediaData) {
        self.entries.insert(key.clone(), data.clone());
    }

    async fn len(&self) -> usize {
        self.entries.len()
    }
}
