//! Domain types for a fishing run.
//!
//! - Progress: status events emitted while the run advances
//! - Outcome: how a run ended, including the prompt when there is one

pub mod outcome;
pub mod progress;

pub use outcome::{RunOutcome, WritingPrompt};
pub use progress::Progress;
