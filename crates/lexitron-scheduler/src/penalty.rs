//! Mistake history with exponential forgetting.

use crate::clock::MS_PER_DAY;
use crate::models::{Timestamp, WordId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lowest decay factor; old mistakes keep some influence.
pub const MIN_DECAY: f64 = 0.3;

/// Ceiling on the reverse-prompt probability from mistakes.
pub const MAX_REVERSE_PROB: f64 = 0.35;

const FAILURE_WEIGHT: f64 = 0.6;
const IDK_WEIGHT: f64 = 0.4;
const REVERSE_BASE_PROB: f64 = 0.05;
const REVERSE_PROB_PER_FAILURE: f64 = 0.03;

/// Mistakes recorded for a single word.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PenaltyRecord {
    #[serde(default)]
    pub failure_count: u32,
    #[serde(default)]
    pub idk_count: u32,
    /// Time of the most recent wrong or "don't know" answer.
    #[serde(default)]
    pub last_wrong_at: Option<Timestamp>,
}

/// Penalty records keyed by word id.
#[derive(Debug, Clone)]
pub struct PenaltyTracker {
    decay_days: f64,
    records: HashMap<WordId, PenaltyRecord>,
}

impl PenaltyTracker {
    pub fn new(decay_days: f64) -> Self {
        Self::from_records(decay_days, HashMap::new())
    }

    pub fn from_records(decay_days: f64, records: HashMap<WordId, PenaltyRecord>) -> Self {
        Self { decay_days, records }
    }

    pub fn records(&self) -> &HashMap<WordId, PenaltyRecord> {
        &self.records
    }

    pub fn record(&self, word_id: &str) -> Option<&PenaltyRecord> {
        self.records.get(word_id)
    }

    pub fn on_wrong(&mut self, word_id: &str, now: Timestamp) {
        let record = self.records.entry(word_id.to_string()).or_default();
        record.failure_count += 1;
        record.last_wrong_at = Some(now);
    }

    pub fn on_idk(&mut self, word_id: &str, now: Timestamp) {
        let record = self.records.entry(word_id.to_string()).or_default();
        record.idk_count += 1;
        record.last_wrong_at = Some(now);
    }

    /// Forget the mistakes of the given words.
    pub fn clear<'a>(&mut self, word_ids: impl IntoIterator<Item = &'a str>) -> usize {
        word_ids
            .into_iter()
            .filter(|id| self.records.remove(*id).is_some())
            .count()
    }

    /// `exp(-days / tau)` floored at 0.3; 1.0 when there was no mistake.
    pub fn decay(&self, last_wrong_at: Option<Timestamp>, now: Timestamp) -> f64 {
        let Some(last) = last_wrong_at else {
            return 1.0;
        };
        let days = now.saturating_sub(last) as f64 / MS_PER_DAY;
        (-days / self.decay_days).exp().clamp(MIN_DECAY, 1.0)
    }

    /// Multiplier for the sampling weight, at least 1.
    pub fn weight_for(&self, word_id: &str, now: Timestamp) -> f64 {
        let Some(record) = self.records.get(word_id) else {
            return 1.0;
        };
        let base = 1.0
            + FAILURE_WEIGHT * record.failure_count as f64
            + IDK_WEIGHT * record.idk_count as f64;
        (base * self.decay(record.last_wrong_at, now)).max(1.0)
    }

    /// Extra chance of a reverse prompt, in `[0, 0.35]`.
    pub fn reverse_prob_for(&self, word_id: &str, now: Timestamp) -> f64 {
        let (failures, last_wrong_at) = self
            .records
            .get(word_id)
            .map(|r| (r.failure_count, r.last_wrong_at))
            .unwrap_or((0, None));
        let p = REVERSE_BASE_PROB + REVERSE_PROB_PER_FAILURE * failures as f64;
        (p * self.decay(last_wrong_at, now)).clamp(0.0, MAX_REVERSE_PROB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NOW: Timestamp = 1_700_000_000_000;
    const DAY: Timestamp = 86_400_000;

    #[test]
    fn test_decay_without_mistake() {
        let tracker = PenaltyTracker::new(3.0);
        assert_eq!(tracker.decay(None, NOW), 1.0);
    }

    #[test]
    fn test_decay_after_three_days() {
        let tracker = PenaltyTracker::new(3.0);
        let decay = tracker.decay(Some(NOW - 3 * DAY), NOW);
        assert!((decay - (-1.0f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_decay_floor() {
        let tracker = PenaltyTracker::new(3.0);
        assert_eq!(tracker.decay(Some(NOW - 60 * DAY), NOW), MIN_DECAY);
    }

    #[test]
    fn test_decay_survives_extreme_timestamps() {
        let tracker = PenaltyTracker::new(3.0);
        assert_eq!(tracker.decay(Some(i64::MIN), i64::MAX), MIN_DECAY);
        assert_eq!(tracker.decay(Some(i64::MAX), i64::MIN), 1.0);
    }

    #[test]
    fn test_weight_two_failures_no_timestamp() {
        let records = HashMap::from([(
            "w".to_string(),
            PenaltyRecord {
                failure_count: 2,
                idk_count: 0,
                last_wrong_at: None,
            },
        )]);
        let tracker = PenaltyTracker::from_records(3.0, records);
        assert!((tracker.weight_for("w", NOW) - 2.2).abs() < 1e-9);
    }

    #[test]
    fn test_weight_floor_after_long_time() {
        let mut tracker = PenaltyTracker::new(3.0);
        tracker.on_idk("w", NOW - 30 * DAY);
        assert_eq!(tracker.weight_for("w", NOW), 1.0);
        assert_eq!(tracker.weight_for("unknown", NOW), 1.0);
    }

    #[test]
    fn test_on_wrong_and_idk_counts() {
        let mut tracker = PenaltyTracker::new(3.0);
        tracker.on_wrong("w", NOW);
        tracker.on_wrong("w", NOW);
        tracker.on_idk("w", NOW + 5);
        let record = tracker.record("w").unwrap();
        assert_eq!(record.failure_count, 2);
        assert_eq!(record.idk_count, 1);
        assert_eq!(record.last_wrong_at, Some(NOW + 5));
        assert!((tracker.weight_for("w", NOW + 5) - 2.6).abs() < 1e-9);
    }

    #[test]
    fn test_reverse_prob_caps() {
        let mut tracker = PenaltyTracker::new(3.0);
        assert!((tracker.reverse_prob_for("w", NOW) - 0.05).abs() < 1e-9);
        for _ in 0..20 {
            tracker.on_wrong("w", NOW);
        }
        assert_eq!(tracker.reverse_prob_for("w", NOW), MAX_REVERSE_PROB);
    }

    #[test]
    fn test_clear() {
        let mut tracker = PenaltyTracker::new(3.0);
        tracker.on_wrong("a", NOW);
        assert_eq!(tracker.clear(["a", "b"]), 1);
        assert!(tracker.record("a").is_none());
    }

    proptest! {
        #[test]
        fn prop_decay_non_increasing(a in 0i64..(400 * DAY), b in 0i64..(400 * DAY)) {
            let tracker = PenaltyTracker::new(3.0);
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            let d_near = tracker.decay(Some(NOW), NOW + near);
            let d_far = tracker.decay(Some(NOW), NOW + far);
            prop_assert!(d_far <= d_near);
            prop_assert!(d_far >= MIN_DECAY);
        }

        #[test]
        fn prop_reverse_prob_bounded(failures in 0u32..200, age in 0i64..(100 * DAY)) {
            let mut tracker = PenaltyTracker::new(3.0);
            for _ in 0..failures {
                tracker.on_wrong("w", NOW - age);
            }
            let p = tracker.reverse_prob_for("w", NOW);
            prop_assert!((0.0..=MAX_REVERSE_PROB).contains(&p));
        }
    }
}
