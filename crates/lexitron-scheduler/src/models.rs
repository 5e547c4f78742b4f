//! Data models shared across the scheduler.

use serde::{Deserialize, Serialize};

/// Opaque word identifier, owned by the deck source.
pub type WordId = String;

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// A single flashcard word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Unique identifier within its deck.
    pub id: WordId,
    /// Prompt side.
    pub front: String,
    /// Answer side.
    pub back: String,
}

impl Word {
    /// Create a new word.
    pub fn new(id: impl Into<WordId>, front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            front: front.into(),
            back: back.into(),
        }
    }
}

/// How the user answered a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Recalled correctly.
    Correct,
    /// "Don't know".
    Idk,
    /// Answered incorrectly.
    Wrong,
}

impl Outcome {
    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Correct => "Correct",
            Self::Idk => "Don't know",
            Self::Wrong => "Wrong",
        }
    }

    /// Whether this outcome counts as a mistake in the session totals.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Idk | Self::Wrong)
    }
}

/// Which side of the card is used as the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Show the front, ask for the back.
    #[default]
    Forward,
    /// Show the back, ask for the front.
    Reverse,
}

/// Global difficulty mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Hard => "Hard",
        }
    }
}

/// Progress through the sets of one deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMeta {
    /// Number of sets, at least 1.
    pub total: usize,
    /// Active set index.
    pub active: usize,
    /// Completion flag per set.
    pub completed: Vec<bool>,
}

impl BatchMeta {
    /// Whether every set is complete.
    pub fn all_completed(&self) -> bool {
        !self.completed.is_empty() && self.completed.iter().all(|c| *c)
    }
}

/// Running counters for the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTotals {
    /// Cards shown.
    pub shown: u64,
    /// Wrong and "don't know" answers.
    pub errors: u64,
}

/// Learned words over deck size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckProgress {
    pub learned: usize,
    pub total: usize,
}

/// What a host needs to redraw after loading a set or answering a card.
#[derive(Debug, Clone, PartialEq)]
pub struct SetView {
    /// Active set index after the operation.
    pub index: usize,
    /// Set progress.
    pub meta: BatchMeta,
    /// Next card, if the deck has any words.
    pub card: Option<Word>,
    /// Prompt direction for `card`.
    pub direction: Direction,
    /// Stars of `card`.
    pub stars: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_errors() {
        assert!(!Outcome::Correct.is_error());
        assert!(Outcome::Idk.is_error());
        assert!(Outcome::Wrong.is_error());
    }

    #[test]
    fn test_outcome_serde_names() {
        let json = serde_json::to_string(&Outcome::Idk).unwrap();
        assert_eq!(json, "\"idk\"");
        let parsed: Outcome = serde_json::from_str("\"wrong\"").unwrap();
        assert_eq!(parsed, Outcome::Wrong);
    }

    #[test]
    fn test_batch_meta_all_completed() {
        let meta = BatchMeta {
            total: 2,
            active: 0,
            completed: vec![true, true],
        };
        assert!(meta.all_completed());

        let meta = BatchMeta {
            total: 2,
            active: 0,
            completed: vec![true, false],
        };
        assert!(!meta.all_completed());
    }
}
