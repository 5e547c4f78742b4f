//! Scheduler configuration.

use serde::{Deserialize, Serialize};

/// Smallest study set the paginator accepts.
pub const MIN_SET_SIZE: usize = 2;

/// How mastery and penalty weights combine into one sampling weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightComposition {
    /// Mastery weight only; penalties affect reverse quizzing alone.
    MasteryOnly,
    /// Mastery weight times penalty weight.
    #[default]
    Product,
}

/// Tunables for the scheduler. Passed in once at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Highest mastery rating.
    #[serde(default = "default_stars_max")]
    pub stars_max: f64,
    /// Words per study set.
    #[serde(default = "default_set_size")]
    pub set_size_default: usize,
    /// Stars at which a word may be quizzed back-to-front.
    #[serde(default = "default_reverse_threshold")]
    pub reverse_threshold: f64,
    /// Recently shown words kept out of the candidate pool.
    #[serde(default = "default_anti_repeat_capacity")]
    pub anti_repeat_capacity: usize,
    /// Time constant of the mistake decay, in days.
    #[serde(default = "default_decay_days")]
    pub decay_half_life_days: f64,
    /// Weight combination used by the sampler.
    #[serde(default)]
    pub weight_composition: WeightComposition,
    /// Chance of a reverse prompt once a word is unlocked.
    #[serde(default = "default_reverse_base_share")]
    pub reverse_base_share: f64,
    /// Move to the next unfinished set when the active one completes.
    #[serde(default = "default_true")]
    pub auto_advance: bool,
    /// Fixed RNG seed for tests and replays; entropy when absent. A restored
    /// session offsets it by the number of cards already shown.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_stars_max() -> f64 { 5.0 }
fn default_set_size() -> usize { 4 }
fn default_reverse_threshold() -> f64 { 2.5 }
fn default_anti_repeat_capacity() -> usize { 5 }

/// Upper bound on the anti-repeat history.
pub const MAX_ANTI_REPEAT_CAPACITY: usize = 64;
fn default_decay_days() -> f64 { 3.0 }
fn default_reverse_base_share() -> f64 { 0.5 }
fn default_true() -> bool { true }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            stars_max: default_stars_max(),
            set_size_default: default_set_size(),
            reverse_threshold: default_reverse_threshold(),
            anti_repeat_capacity: default_anti_repeat_capacity(),
            decay_half_life_days: default_decay_days(),
            weight_composition: WeightComposition::default(),
            reverse_base_share: default_reverse_base_share(),
            auto_advance: true,
            seed: None,
        }
    }
}

impl SchedulerConfig {
    /// Effective set size. Values below the floor fall back to the default.
    pub fn set_size(&self) -> usize {
        if self.set_size_default >= MIN_SET_SIZE {
            self.set_size_default
        } else {
            default_set_size()
        }
    }

    /// Effective maximum stars.
    pub fn stars_max(&self) -> f64 {
        if self.stars_max.is_finite() && self.stars_max > 0.0 {
            self.stars_max
        } else {
            default_stars_max()
        }
    }

    /// Effective anti-repeat capacity, capped at [`MAX_ANTI_REPEAT_CAPACITY`].
    pub fn anti_repeat_capacity(&self) -> usize {
        self.anti_repeat_capacity.min(MAX_ANTI_REPEAT_CAPACITY)
    }

    /// Stars needed before reverse quizzing unlocks.
    pub fn reverse_unlock_threshold(&self) -> f64 {
        if self.reverse_threshold.is_finite() {
            self.reverse_threshold
        } else {
            default_reverse_threshold()
        }
    }

    /// Effective decay time constant in days.
    pub fn decay_days(&self) -> f64 {
        if self.decay_half_life_days.is_finite() && self.decay_half_life_days > 0.0 {
            self.decay_half_life_days
        } else {
            default_decay_days()
        }
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the study set size.
    pub fn with_set_size(mut self, size: usize) -> Self {
        self.set_size_default = size;
        self
    }
}
