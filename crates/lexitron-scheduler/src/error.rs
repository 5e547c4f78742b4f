//! Scheduler error types.
//!
//! None of these are fatal. The facade absorbs them into degraded results
//! (empty slices, clamped cursors, default maps) and logs what it absorbed.

use thiserror::Error;

/// Conditions the scheduler recovers from locally.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchedulerError {
    /// The deck is empty or could not be resolved.
    #[error("Deck is empty or missing: {0}")]
    InvalidDeck(String),

    /// A persisted map could not be decoded and was reset.
    #[error("Corrupt persisted state in '{map}': {reason}")]
    CorruptPersistedState { map: String, reason: String },

    /// A batch cursor pointed past the end of the deck.
    #[error("Batch index {index} out of range (total {total})")]
    OutOfRangeIndex { index: i64, total: usize },
}

/// Result type for checked scheduler helpers.
pub type SchedulerResult<T> = Result<T, SchedulerError>;
