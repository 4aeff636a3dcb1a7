//! promptfish - writing prompts fished out of an ebook library
//!
//! Connects to a server holding an ebook collection (usually a Calibre
//! library), picks a random book that is not excluded by subject or title,
//! downloads it, and prints one random sentence from it.
//!
//! # Pipeline
//!
//! connect → enumerate → filter → pick book → download → extract → pick sentence
//!
//! Every stage finishes before the next starts. The only local state is the
//! staged download, which is removed when the run ends.
//!
//! # Modules
//!
//! - `adapters`: Transports (SSH subprocess, local filesystem)
//! - `library`: Catalog enumeration, Calibre metadata, eligibility filter
//! - `extract`: EPUB reading, markup stripping, sentence splitting
//! - `core`: Orchestration (Orchestrator, Selector, StagedFile)
//! - `domain`: Progress events and run outcomes
//! - `config`: Layered settings
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Fish a prompt
//! UNRAID_HOST=tower UNRAID_BOOK_PATH=/mnt/user/Books promptfish
//!
//! # See what is eligible, and why
//! promptfish list --all
//!
//! # Sentences from a local book
//! promptfish extract book.epub --count 5
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod extract;
pub mod library;

// Re-export main types at crate root for convenience
pub use adapters::{LocalTransport, SshTransport, Transport};
pub use crate::core::{Orchestrator, RandomSelector, Selector};
pub use domain::{Progress, RunOutcome, WritingPrompt};
pub use extract::{extract_sentences, SentenceBounds};
pub use library::{is_eligible, CatalogEntry, CatalogMode, FilterConfig};
