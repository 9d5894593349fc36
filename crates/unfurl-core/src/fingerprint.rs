//! Request fingerprints: the cache key for a resolution.
//!
//! A [`Fingerprint`] is the SHA-256 digest of the URL string, hex encoded.
//! Every cache read and write for a URL goes through the same fingerprint,
//! so the derivation lives in one place.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Deterministic cache key derived from a URL string.
///
/// Two requests for the same URL string always produce the same fingerprint;
/// any difference in the string (scheme, query order, trailing slash) yields
/// a different one. No normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of a URL string.
    pub fn of_url(url: &str) -> Self {
        let digest = Sha256::digest(url.as_bytes());
        Fingerprint(hex::encode(digest))
    }

    /// The hex digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
