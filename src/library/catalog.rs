//! Catalog of candidate books on the server.
//!
//! Enumerates EPUB files under a library root, either from Calibre's
//! metadata database (with tags) or from a plain recursive `find` (no tags),
//! and splits them into the full list and the filter-eligible list.

use std::collections::BTreeSet;
use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::adapters::{shell_quote, Transport};
use crate::core::StagedFile;

use super::calibre::{self, CalibreRow};
use super::filter::{evaluate, Eligibility, FilterConfig};

/// File extension the catalog looks for (case-sensitive)
pub const EPUB_EXTENSION: &str = ".epub";

/// How the catalog is enumerated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogMode {
    /// Query Calibre's metadata.db with the server's sqlite3
    #[default]
    Calibre,

    /// Recursive `find`, no tag information
    Find,

    /// Download metadata.db and query it locally
    CalibreLocal,
}

impl fmt::Display for CatalogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogMode::Calibre => write!(f, "calibre"),
            CatalogMode::Find => write!(f, "find"),
            CatalogMode::CalibreLocal => write!(f, "calibre-local"),
        }
    }
}

impl std::str::FromStr for CatalogMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "calibre" | "db" => Ok(CatalogMode::Calibre),
            "find" | "fs" => Ok(CatalogMode::Find),
            "calibre-local" | "local-db" => Ok(CatalogMode::CalibreLocal),
            _ => anyhow::bail!("Unknown catalog mode: {}", s),
        }
    }
}

impl CatalogMode {
    /// Whether this mode yields tag information
    pub fn has_tags(&self) -> bool {
        !matches!(self, CatalogMode::Find)
    }
}

/// One candidate book file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Fully qualified location on the server
    pub path: String,

    /// Lowercased tag names
    pub tags: BTreeSet<String>,
}

impl CatalogEntry {
    /// Create an untagged entry
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            tags: BTreeSet::new(),
        }
    }

    /// Add tags, lowercasing and de-duplicating them
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        self.tags.extend(
            tags.into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .filter(|t| !t.is_empty()),
        );
        self
    }

    /// Last path component
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Lowercased file name without the `.epub` extension, for keyword matching
    pub fn title_key(&self) -> String {
        let name = self.file_name();
        name.strip_suffix(EPUB_EXTENSION).unwrap_or(name).to_lowercase()
    }

    /// Run the eligibility rules on this entry
    pub fn eligibility(&self, config: &FilterConfig) -> Eligibility {
        evaluate(&self.tags, &self.title_key(), config)
    }
}

/// Result of enumerating the library
#[derive(Debug, Clone, Default)]
pub struct CatalogListing {
    /// Every entry found, in source order
    pub all: Vec<CatalogEntry>,

    /// Entries that passed the filter, in source order
    pub eligible: Vec<CatalogEntry>,

    /// Non-fatal problems reported by the enumeration command
    pub warnings: Vec<String>,
}

impl CatalogListing {
    /// Listing without filtering (no tag information available)
    pub fn unfiltered(entries: Vec<CatalogEntry>) -> Self {
        Self {
            eligible: entries.clone(),
            all: entries,
            warnings: Vec::new(),
        }
    }

    /// Listing with the eligibility filter applied
    pub fn filtered(entries: Vec<CatalogEntry>, config: &FilterConfig) -> Self {
        let eligible = entries
            .iter()
            .filter(|entry| {
                let decision = entry.eligibility(config);
                debug!(path = %entry.path, %decision, "Filter decision");
                decision.is_included()
            })
            .cloned()
            .collect();

        Self {
            all: entries,
            eligible,
            warnings: Vec::new(),
        }
    }

    fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// No files at all were found
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Paths of the eligible entries
    pub fn eligible_paths(&self) -> Vec<&str> {
        self.eligible.iter().map(|e| e.path.as_str()).collect()
    }

    /// How many entries the filter removed
    pub fn excluded_count(&self) -> usize {
        self.all.len() - self.eligible.len()
    }
}

/// Pair every entry with its filter decision
pub fn classify<'a>(
    entries: &'a [CatalogEntry],
    config: &FilterConfig,
) -> Vec<(&'a CatalogEntry, Eligibility)> {
    entries
        .iter()
        .map(|entry| (entry, entry.eligibility(config)))
        .collect()
}

/// Parse `find` output: one path per line
pub fn parse_find_output(raw: &str) -> Vec<CatalogEntry> {
    raw.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(CatalogEntry::new)
        .collect()
}

/// Turn Calibre rows into entries rooted at `root`
pub fn entries_from_rows(root: &str, rows: Vec<CalibreRow>) -> Vec<CatalogEntry> {
    let root = root.trim_end_matches('/');
    rows.into_iter()
        .map(|row| {
            let path = format!("{}/{}/{}{}", root, row.book_path, row.file_name, EPUB_EXTENSION);
            CatalogEntry::new(path).with_tags(row.tags)
        })
        .collect()
}

/// Where and how to enumerate books
#[derive(Debug, Clone)]
pub struct CatalogSource {
    root: String,
    mode: CatalogMode,
}

impl CatalogSource {
    pub fn new(root: impl Into<String>, mode: CatalogMode) -> Self {
        Self {
            root: root.into(),
            mode,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Shell command for the `find` mode
    pub fn find_command(&self) -> String {
        format!(
            "find {} -type f -name {}",
            shell_quote(&self.root),
            shell_quote(&format!("*{}", EPUB_EXTENSION))
        )
    }

    /// Enumerate the library and apply the filter where tags exist
    #[instrument(skip(self, transport, filter), fields(root = %self.root, mode = %self.mode))]
    pub async fn enumerate(
        &self,
        transport: &dyn Transport,
        filter: &FilterConfig,
    ) -> Result<CatalogListing> {
        let listing = match self.mode {
            CatalogMode::Find => {
                let (entries, warnings) = self.enumerate_find(transport).await?;
                CatalogListing::unfiltered(entries).with_warnings(warnings)
            }
            CatalogMode::Calibre => {
                let (entries, warnings) = self.enumerate_calibre(transport).await?;
                CatalogListing::filtered(entries, filter).with_warnings(warnings)
            }
            CatalogMode::CalibreLocal => {
                let (entries, warnings) = self.enumerate_calibre_local(transport).await?;
                CatalogListing::filtered(entries, filter).with_warnings(warnings)
            }
        };

        for warning in &listing.warnings {
            warn!("{}", warning);
        }
        info!(
            found = listing.all.len(),
            eligible = listing.eligible.len(),
            "Catalog enumerated"
        );

        Ok(listing)
    }

    async fn enumerate_find(
        &self,
        transport: &dyn Transport,
    ) -> Result<(Vec<CatalogEntry>, Vec<String>)> {
        let output = transport
            .exec(&self.find_command())
            .await
            .context("Failed to run find")?;

        let entries = parse_find_output(&output.stdout);
        let warnings = stderr_warning("'find' command stderr", &output.stderr, entries.is_empty());
        Ok((entries, warnings))
    }

    async fn enumerate_calibre(
        &self,
        transport: &dyn Transport,
    ) -> Result<(Vec<CatalogEntry>, Vec<String>)> {
        let output = transport
            .exec(&calibre::remote_query_command(&self.root))
            .await
            .context("Failed to run sqlite3")?;

        let entries = entries_from_rows(&self.root, calibre::parse_rows(&output.stdout));
        let warnings = stderr_warning("sqlite3 error", &output.stderr, entries.is_empty());
        Ok((entries, warnings))
    }

    async fn enumerate_calibre_local(
        &self,
        transport: &dyn Transport,
    ) -> Result<(Vec<CatalogEntry>, Vec<String>)> {
        let db_path = calibre::database_path(&self.root);
        let staged = StagedFile::new(".db")?;

        if let Err(e) = transport.download(&db_path, staged.path()).await {
            return Ok((Vec::new(), vec![format!("Could not fetch {}: {}", db_path, e)]));
        }

        let rows = tokio::task::spawn_blocking(move || calibre::query_database(staged.path()))
            .await
            .context("Calibre query task panicked")?;

        match rows {
            Ok(rows) => Ok((entries_from_rows(&self.root, rows), Vec::new())),
            Err(e) => Ok((Vec::new(), vec![format!("sqlite error: {:#}", e)])),
        }
    }
}

/// Stderr only matters when nothing usable came back
fn stderr_warning(label: &str, stderr: &str, no_results: bool) -> Vec<String> {
    let stderr = stderr.trim();
    if no_results && !stderr.is_empty() {
        vec![format!("Warning: {}: {}", label, stderr)]
    } else {
        Vec::new()
    }
}
