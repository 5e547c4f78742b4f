//! # lexitron-scheduler
//!
//! Adaptive word selection for the Lexitron vocabulary trainer.
//!
//! ## Features
//!
//! - Per-word mastery ("stars") with recency-weighted sampling
//! - Mistake penalties that fade out over a few days
//! - Anti-repeat buffer over the most recently shown words
//! - Roulette-wheel sampling biased against the previous pick
//! - Fixed-size study sets with per-deck progress tracking
//!
//! Nothing in this crate does I/O. Decks come from a [`DeckResolver`], time
//! from a [`Clock`], and persistence is left to the caller through
//! [`StateSnapshot`].

mod anti_repeat;
mod batches;
mod clock;
mod config;
mod deck;
mod error;
mod mastery;
mod models;
mod penalty;
mod sampler;
mod scheduler;
mod state;

pub use anti_repeat::AntiRepeatBuffer;
pub use batches::{total_batches, BatchPaginator};
pub use clock::{Clock, ManualClock, SystemClock, MS_PER_DAY, MS_PER_MINUTE};
pub use config::{SchedulerConfig, WeightComposition, MAX_ANTI_REPEAT_CAPACITY};
pub use deck::{DeckResolver, InMemoryDecks};
pub use error::{SchedulerError, SchedulerResult};
pub use mastery::{MasteryRecord, MasteryStore};
pub use models::{
    BatchMeta, DeckProgress, Difficulty, Direction, Outcome, SessionTotals, SetView, Timestamp,
    Word, WordId,
};
pub use penalty::{PenaltyRecord, PenaltyTracker};
pub use sampler::{WeightedSampler, FORBIDDEN_PENALTY};
pub use scheduler::Scheduler;
pub use state::{RestoreReport, SchedulerState, SessionState, StateBlobs, StateSnapshot};
