//! How a run ends.

use serde::Serialize;

/// A sentence fished out of a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WritingPrompt {
    /// The chosen sentence
    pub sentence: String,

    /// Source book location on the server
    pub book_path: String,

    /// Source book file name
    pub book_name: String,

    /// How many sentences the book offered
    pub candidates: usize,
}

/// Terminal state of a run.
///
/// Only `Prompt` delivers something; every other variant is a graceful stop
/// the user is told about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// A prompt was produced
    Prompt(WritingPrompt),

    /// Enumeration returned nothing at all
    NoFilesFound,

    /// Every entry was excluded by the filter
    AllFiltered { found: usize },

    /// The book opened fine but produced no usable sentence
    NoSentences { book: String },

    /// The book could not be read
    ExtractionFailed { book: String, error: String },
}

impl RunOutcome {
    /// The prompt, if the run produced one
    pub fn prompt(&self) -> Option<&WritingPrompt> {
        match self {
            RunOutcome::Prompt(prompt) => Some(prompt),
            _ => None,
        }
    }

    /// User-facing explanation for the non-prompt outcomes
    pub fn message(&self) -> Option<String> {
        match self {
            RunOutcome::Prompt(_) => None,
            RunOutcome::NoFilesFound => Some("No epub files found.".to_string()),
            RunOutcome::AllFiltered { .. } => Some(
                "No books left after filtering. Check your EXCLUDE_SUBJECTS.".to_string(),
            ),
            RunOutcome::NoSentences { .. } => {
                Some("Could not extract any valid sentences from this book.".to_string())
            }
            RunOutcome::ExtractionFailed { error, .. } => {
                Some(format!("Error reading epub: {}", error))
            }
        }
    }
}
