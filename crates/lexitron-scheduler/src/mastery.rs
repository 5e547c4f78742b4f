//! Per-word mastery ratings and the recency-weighted sampling weight.

use crate::clock::MS_PER_MINUTE;
use crate::models::{Timestamp, Word, WordId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stars gained or lost per answer.
pub const STAR_STEP: f64 = 0.5;

/// Minutes of absence per recency point.
const RECENCY_MINUTES_PER_POINT: f64 = 3.0;

/// Cap on the recency bonus.
const RECENCY_CAP: f64 = 5.0;

/// Floor on the mastery weight.
const MIN_WEIGHT: f64 = 0.1;

/// Mastery of a single word.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasteryRecord {
    /// Rating in `[0, stars_max]`, in half-star steps.
    #[serde(default)]
    pub stars: f64,
    /// When the word was last shown.
    #[serde(default)]
    pub last_seen_at: Option<Timestamp>,
}

/// Mastery ratings keyed by word id. Records are created on first write.
#[derive(Debug, Clone)]
pub struct MasteryStore {
    stars_max: f64,
    records: HashMap<WordId, MasteryRecord>,
}

impl MasteryStore {
    /// Create an empty store.
    pub fn new(stars_max: f64) -> Self {
        Self::from_records(stars_max, HashMap::new())
    }

    /// Rebuild a store from persisted records.
    pub fn from_records(stars_max: f64, records: HashMap<WordId, MasteryRecord>) -> Self {
        Self { stars_max, records }
    }

    /// Persisted view.
    pub fn records(&self) -> &HashMap<WordId, MasteryRecord> {
        &self.records
    }

    pub fn stars_max(&self) -> f64 {
        self.stars_max
    }

    /// Stored rating, or 0 for unseen words.
    pub fn get_stars(&self, word_id: &str) -> f64 {
        self.records.get(word_id).map(|r| r.stars).unwrap_or(0.0)
    }

    /// When the word was last shown, if ever.
    pub fn last_seen_at(&self, word_id: &str) -> Option<Timestamp> {
        self.records.get(word_id).and_then(|r| r.last_seen_at)
    }

    /// Whether the word reached the maximum rating.
    pub fn is_learned(&self, word_id: &str) -> bool {
        self.get_stars(word_id) >= self.stars_max
    }

    /// Add half a star.
    pub fn on_correct(&mut self, word_id: &str) -> f64 {
        self.adjust(word_id, STAR_STEP)
    }

    /// Remove half a star ("don't know").
    pub fn on_idk(&mut self, word_id: &str) -> f64 {
        self.adjust(word_id, -STAR_STEP)
    }

    fn adjust(&mut self, word_id: &str, delta: f64) -> f64 {
        let stars_max = self.stars_max;
        let record = self.records.entry(word_id.to_string()).or_default();
        record.stars = (record.stars + delta).clamp(0.0, stars_max);
        record.stars
    }

    /// Record that the word was just shown.
    pub fn mark_seen(&mut self, word_id: &str, now: Timestamp) {
        self.records.entry(word_id.to_string()).or_default().last_seen_at = Some(now);
    }

    /// Forget everything about the given words.
    pub fn clear<'a>(&mut self, word_ids: impl IntoIterator<Item = &'a str>) -> usize {
        word_ids
            .into_iter()
            .filter(|id| self.records.remove(*id).is_some())
            .count()
    }

    /// Sampling weight favouring weak or stale words.
    ///
    /// `1 + 2 * deficit + recency`, where recency grows by one point every three
    /// minutes since the word was last shown and caps at five. A word that was
    /// never shown gets no recency bonus. Never below 0.1.
    pub fn weight_for(&self, word: &Word, now: Timestamp) -> f64 {
        let stars = self.get_stars(&word.id).clamp(0.0, self.stars_max);
        let deficit = self.stars_max - stars;
        let elapsed_minutes = self
            .last_seen_at(&word.id)
            .map(|last| (now.saturating_sub(last) as f64 / MS_PER_MINUTE).max(0.0))
            .unwrap_or(0.0);
        let recency = (elapsed_minutes / RECENCY_MINUTES_PER_POINT).min(RECENCY_CAP);
        (1.0 + 2.0 * deficit + recency).max(MIN_WEIGHT)
    }
}
