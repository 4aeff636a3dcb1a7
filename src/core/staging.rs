//! Transient local copies of downloaded files.
//!
//! A `StagedFile` owns a named temporary file. Dropping it removes the file,
//! so every exit path (success, extraction error, early return, or the run
//! future being dropped on Ctrl-C) cleans up without manual bookkeeping.

use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::debug;

/// Exclusively owned temporary file holding downloaded bytes
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    /// Create an empty staged file with the given suffix (e.g. ".epub")
    pub fn new(suffix: &str) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("promptfish-")
            .suffix(suffix)
            .tempfile()
            .context("Failed to create staging file")?;

        debug!(path = %file.path().display(), "Staged file created");
        Ok(Self { file })
    }

    /// Path of the staged file on local disk
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Size of the staged contents in bytes
    pub fn size(&self) -> Result<u64> {
        let meta = std::fs::metadata(self.path())
            .with_context(|| format!("Failed to stat {}", self.path().display()))?;
        Ok(meta.len())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        debug!(path = %self.file.path().display(), "Removing staged file");
    }
}
