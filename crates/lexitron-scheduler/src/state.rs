//! Scheduler state and its persisted form.
//!
//! State is persisted as four independent JSON blobs so that one corrupt map
//! never takes the others down with it.

use crate::batches::BatchPaginator;
use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::mastery::{MasteryRecord, MasteryStore};
use crate::models::{Difficulty, SessionTotals, WordId};
use crate::penalty::{PenaltyRecord, PenaltyTracker};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Session-wide values that are not tied to a single word.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub totals: SessionTotals,
    #[serde(default)]
    pub last_shown_word_id: Option<WordId>,
    /// Anti-repeat history, oldest first.
    #[serde(default)]
    pub recent_word_ids: Vec<WordId>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// Everything the scheduler owns, owned in turn by the caller.
#[derive(Debug, Clone)]
pub struct SchedulerState {
    pub mastery: MasteryStore,
    pub penalties: PenaltyTracker,
    pub batches: BatchPaginator,
    pub session: SessionState,
}

/// Serializable copy of [`SchedulerState`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub mastery: HashMap<WordId, MasteryRecord>,
    #[serde(default)]
    pub penalties: HashMap<WordId, PenaltyRecord>,
    #[serde(default)]
    pub cursors: HashMap<String, usize>,
    #[serde(default)]
    pub session: SessionState,
}

/// Raw JSON per persisted map, as read from or written to storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateBlobs {
    pub mastery: Option<String>,
    pub penalties: Option<String>,
    pub cursors: Option<String>,
    pub session: Option<String>,
}

impl StateBlobs {
    pub const MASTERY: &'static str = "mastery";
    pub const PENALTIES: &'static str = "penalties";
    pub const CURSORS: &'static str = "cursors";
    pub const SESSION: &'static str = "session";

    /// Storage keys in a fixed order.
    pub const KEYS: [&'static str; 4] = [Self::MASTERY, Self::PENALTIES, Self::CURSORS, Self::SESSION];

    pub fn from_snapshot(snapshot: &StateSnapshot) -> serde_json::Result<Self> {
        Ok(Self {
            mastery: Some(serde_json::to_string(&snapshot.mastery)?),
            penalties: Some(serde_json::to_string(&snapshot.penalties)?),
            cursors: Some(serde_json::to_string(&snapshot.cursors)?),
            session: Some(serde_json::to_string(&snapshot.session)?),
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            Self::MASTERY => self.mastery.as_deref(),
            Self::PENALTIES => self.penalties.as_deref(),
            Self::CURSORS => self.cursors.as_deref(),
            Self::SESSION => self.session.as_deref(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: String) {
        match key {
            Self::MASTERY => self.mastery = Some(value),
            Self::PENALTIES => self.penalties = Some(value),
            Self::CURSORS => self.cursors = Some(value),
            Self::SESSION => self.session = Some(value),
            _ => tracing::warn!(key, "ignoring unknown state blob"),
        }
    }

    /// `(key, json)` pairs for the blobs that are present.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        Self::KEYS
            .into_iter()
            .filter_map(move |key| self.get(key).map(|value| (key, value)))
    }
}

/// Maps that had to be reset while restoring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreReport {
    pub errors: Vec<SchedulerError>,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl SchedulerState {
    /// Fresh state with no history.
    pub fn new(config: &SchedulerConfig) -> Self {
        Self::from_snapshot(config, StateSnapshot::default())
    }

    /// Rebuild state from an already decoded snapshot.
    pub fn from_snapshot(config: &SchedulerConfig, snapshot: StateSnapshot) -> Self {
        let stars_max = config.stars_max();
        let mastery = snapshot
            .mastery
            .into_iter()
            .map(|(id, mut record)| {
                record.stars = if record.stars.is_finite() {
                    record.stars.clamp(0.0, stars_max)
                } else {
                    0.0
                };
                (id, record)
            })
            .collect();

        Self {
            mastery: MasteryStore::from_records(stars_max, mastery),
            penalties: PenaltyTracker::from_records(config.decay_days(), snapshot.penalties),
            batches: BatchPaginator::from_cursors(config.set_size(), snapshot.cursors),
            session: snapshot.session,
        }
    }

    /// Decode each blob independently. A blob that fails to parse is reset to
    /// its empty default and reported.
    pub fn restore(config: &SchedulerConfig, blobs: &StateBlobs) -> (Self, RestoreReport) {
        let mut report = RestoreReport::default();
        let snapshot = StateSnapshot {
            mastery: decode_blob(StateBlobs::MASTERY, blobs.mastery.as_deref(), &mut report),
            penalties: decode_blob(StateBlobs::PENALTIES, blobs.penalties.as_deref(), &mut report),
            cursors: decode_blob(StateBlobs::CURSORS, blobs.cursors.as_deref(), &mut report),
            session: decode_blob(StateBlobs::SESSION, blobs.session.as_deref(), &mut report),
        };
        (Self::from_snapshot(config, snapshot), report)
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            mastery: self.mastery.records().clone(),
            penalties: self.penalties.records().clone(),
            cursors: self.batches.cursors().clone(),
            session: self.session.clone(),
        }
    }
}

fn decode_blob<T>(map: &str, raw: Option<&str>, report: &mut RestoreReport) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return T::default();
    };
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            let err = SchedulerError::CorruptPersistedState {
                map: map.to_string(),
                reason: e.to_string(),
            };
            tracing::warn!(%err, "resetting persisted map to defaults");
            report.errors.push(err);
            T::default()
        }
    }
}
