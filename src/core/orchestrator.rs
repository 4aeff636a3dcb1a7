//! Main orchestrator for a fishing run.
//!
//! Sequential pipeline, each stage finishing before the next starts:
//! connect → enumerate → filter → pick book → download → extract → pick sentence.

use anyhow::{Context, Result};
use tracing::{debug, error, info, instrument, warn};

use crate::adapters::Transport;
use crate::domain::{Progress, RunOutcome, WritingPrompt};
use crate::extract::{extract_sentences, SentenceBounds};
use crate::library::{CatalogEntry, CatalogListing, CatalogSource, FilterConfig};

use super::selector::{choose, Selector};
use super::staging::StagedFile;

/// Receives progress events as the run advances
pub trait Reporter: Send {
    fn report(&mut self, progress: &Progress);
}

/// Reporter that discards everything
#[derive(Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&mut self, _progress: &Progress) {}
}

/// Reporter that records events, mostly for tests and `--json` output
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<Progress>,
}

impl Reporter for RecordingReporter {
    fn report(&mut self, progress: &Progress) {
        self.events.push(progress.clone());
    }
}

/// Main run orchestrator
pub struct Orchestrator {
    transport: Box<dyn Transport>,
    source: CatalogSource,
    filter: FilterConfig,
    bounds: SentenceBounds,
}

impl Orchestrator {
    /// Create an orchestrator over a transport and a catalog source
    pub fn new(transport: Box<dyn Transport>, source: CatalogSource, filter: FilterConfig) -> Self {
        Self {
            transport,
            source,
            filter,
            bounds: SentenceBounds::default(),
        }
    }

    /// Override the sentence length bounds
    pub fn with_bounds(mut self, bounds: SentenceBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    /// Open the session and enumerate the library
    #[instrument(skip(self, reporter), fields(transport = %self.transport.name()))]
    pub async fn list(&self, reporter: &mut dyn Reporter) -> Result<CatalogListing> {
        reporter.report(&Progress::Connecting {
            target: self.transport.target().to_string(),
        });
        self.transport.connect().await?;

        reporter.report(&Progress::Searching {
            root: self.source.root().to_string(),
        });
        let listing = self
            .source
            .enumerate(self.transport.as_ref(), &self.filter)
            .await?;

        for warning in &listing.warnings {
            reporter.report(&Progress::Warning {
                message: warning.clone(),
            });
        }

        Ok(listing)
    }

    /// Run the whole pipeline and return how it ended
    #[instrument(skip(self, selector, reporter), fields(root = %self.source.root()))]
    pub async fn fish(
        &self,
        selector: &mut dyn Selector,
        reporter: &mut dyn Reporter,
    ) -> Result<RunOutcome> {
        let listing = self.list(reporter).await?;

        if listing.is_empty() {
            return Ok(RunOutcome::NoFilesFound);
        }

        reporter.report(&Progress::Found {
            count: listing.all.len(),
        });
        if listing.excluded_count() > 0 {
            reporter.report(&Progress::Filtered {
                eligible: listing.eligible.len(),
                found: listing.all.len(),
            });
        }

        let Some(book) = choose(selector, &listing.eligible) else {
            warn!(found = listing.all.len(), "Every book was filtered out");
            return Ok(RunOutcome::AllFiltered {
                found: listing.all.len(),
            });
        };

        let book_name = book.file_name().to_string();
        info!(book = %book.path, "Selected book");
        reporter.report(&Progress::Selected {
            book: book_name.clone(),
        });

        self.fish_from_book(book, selector, reporter).await
    }

    /// Download one book, extract its sentences, and pick one
    async fn fish_from_book(
        &self,
        book: &CatalogEntry,
        selector: &mut dyn Selector,
        reporter: &mut dyn Reporter,
    ) -> Result<RunOutcome> {
        let book_name = book.file_name().to_string();

        let staged = StagedFile::new(".epub")?;
        reporter.report(&Progress::Downloading {
            book: book_name.clone(),
        });
        self.transport
            .download(&book.path, staged.path())
            .await
            .with_context(|| format!("Failed to download {}", book.path))?;
        debug!(book = %book.path, bytes = staged.size()?, "Book downloaded");

        reporter.report(&Progress::Extracting);
        let bounds = self.bounds;
        // The staged file moves into the task and is removed when it finishes
        let extracted = tokio::task::spawn_blocking(move || {
            let result = extract_sentences(staged.path(), &bounds);
            drop(staged);
            result
        })
        .await
        .context("Extraction task panicked")?;

        let sentences = match extracted {
            Ok(sentences) => sentences,
            Err(e) => {
                error!(book = %book.path, error = %e, "Extraction failed");
                return Ok(RunOutcome::ExtractionFailed {
                    book: book_name,
                    error: e.to_string(),
                });
            }
        };

        reporter.report(&Progress::Extracted {
            count: sentences.len(),
        });

        match choose(selector, &sentences) {
            Some(sentence) => Ok(RunOutcome::Prompt(WritingPrompt {
                sentence: sentence.clone(),
                book_path: book.path.clone(),
                book_name,
                candidates: sentences.len(),
            })),
            None => Ok(RunOutcome::NoSentences { book: book_name }),
        }
    }
}
