//! Filesystem storage for generated documents.
//!
//! Documents are stored flat under a base directory, one file per request
//! fingerprint. Writes go through a temporary file in the same directory
//! followed by a rename, so a concurrent reader sees either the old document
//! or the new one, never a torn file.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use unfurl_core::Fingerprint;

/// Filesystem manager for generated document artifacts.
pub struct ArtifactStore {
    base_dir: PathBuf,
}

impl ArtifactStore {
    /// Create a new `ArtifactStore` rooted at the given directory.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Path of the document for `fingerprint`.
    pub fn path_for(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.base_dir.join(format!("{fingerprint}.html"))
    }

    /// Whether a document already exists for `fingerprint`.
    pub fn exists(&self, fingerprint: &Fingerprint) -> bool {
        self.path_for(fingerprint).exists()
    }

    /// Read the stored document for `fingerprint`.
    pub fn read(&self, fingerprint: &Fingerprint) -> Result<String> {
        let path = self.path_for(fingerprint);
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read document: {}", path.display()))
    }

    /// Atomically write the document for `fingerprint`.
    ///
    /// The temp file must live in the base directory: rename is only atomic
    /// within one filesystem.
    pub fn write_atomic(&self, fingerprint: &Fingerprint, content: &str) -> Result<()> {
        std::fs::create_dir_all(&self.base_dir).with_context(|| {
            format!(
                "Failed to create document directory: {}",
                self.base_dir.display()
            )
        })?;

        let path = self.path_for(fingerprint);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.base_dir)
            .context("Failed to create temp file for document")?;
        tmp.write_all(content.as_bytes())
            .context("Failed to write document contents")?;
        tmp.persist(&path)
            .with_context(|| format!("Failed to persist document: {}", path.display()))?;

        Ok(())
    }

    /// The directory documents are stored under.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
