//! unfurl-core: shared types, fingerprints, and the unified error type.
//!
//! This crate is the foundational dependency for the unfurl service,
//! providing the media payload model, the cache-key fingerprint, and a
//! unified error type that HTTP handlers map to status codes.

pub mod error;
pub mod fingerprint;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use fingerprint::Fingerprint;
pub use media::{MediaData, MediaError};
