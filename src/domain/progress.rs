//! Status events emitted by the orchestrator.
//!
//! Presentation is decoupled from the pipeline: the orchestrator reports
//! these, and a `Reporter` decides how (or whether) to show them.

use serde::Serialize;

/// One step of visible progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Progress {
    /// Opening the session
    Connecting { target: String },

    /// Enumerating the library
    Searching { root: String },

    /// Non-fatal enumeration problem
    Warning { message: String },

    /// Total number of book files found
    Found { count: usize },

    /// Count left after filtering (only when filtering removed something)
    Filtered { eligible: usize, found: usize },

    /// The book that was picked
    Selected { book: String },

    /// Transferring the book to local staging
    Downloading { book: String },

    /// Reading sentences out of the staged book
    Extracting,

    /// Number of candidate sentences extracted
    Extracted { count: usize },
}
