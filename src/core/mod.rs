//! Core run logic.
//!
//! This module contains:
//! - Orchestrator: the sequential fishing pipeline
//! - Selector: uniform random choice behind a trait
//! - StagedFile: scoped temporary storage for downloaded books

pub mod orchestrator;
pub mod selector;
pub mod staging;

// Re-export commonly used types
pub use orchestrator::{NullReporter, Orchestrator, RecordingReporter, Reporter};
pub use selector::{choose, FixedSelector, RandomSelector, Selector};
pub use staging::StagedFile;
