//! Sentence extraction from EPUB books.
//!
//! ```text
//! EPUB (zip) → container.xml → OPF manifest → (X)HTML documents
//!            → strip markup → flat text → sentence scan → bounded sentences
//! ```
//!
//! The pipeline is a pure function of the archive contents: the same file
//! always yields the same ordered sentence list.

pub mod epub;
pub mod markup;
pub mod sentences;

use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub use epub::{ContentDocument, EpubBundle};
pub use markup::strip_markup;
pub use sentences::{split_sentences, SentenceBounds};

/// Errors while reading a book
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a valid EPUB archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("EPUB is missing {0}")]
    MissingEntry(String),

    #[error("No rootfile declared in META-INF/container.xml")]
    NoRootfile,

    #[error("Malformed XML in {entry}: {source}")]
    Xml {
        entry: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extract bounded sentences from an EPUB on disk
pub fn extract_sentences(path: &Path, bounds: &SentenceBounds) -> Result<Vec<String>, ExtractError> {
    let mut bundle = EpubBundle::open(path)?;
    sentences_from_bundle(&mut bundle, bounds)
}

/// Extract bounded sentences from an already opened bundle
pub fn sentences_from_bundle<R: Read + Seek>(
    bundle: &mut EpubBundle<R>,
    bounds: &SentenceBounds,
) -> Result<Vec<String>, ExtractError> {
    let documents = bundle.documents().to_vec();
    let mut sentences = Vec::new();

    for document in &documents {
        let Some(markup) = bundle.read_document(document)? else {
            continue;
        };

        let text = strip_markup(&markup);
        let before = sentences.len();
        sentences.extend(split_sentences(&text, bounds).into_iter().map(str::to_string));
        debug!(
            document = %document.path,
            id = %document.id,
            media_type = %document.media_type,
            sentences = sentences.len() - before,
            "Extracted document"
        );
    }

    Ok(sentences)
}
