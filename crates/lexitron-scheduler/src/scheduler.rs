//! The scheduler facade used by hosts.

use crate::anti_repeat::AntiRepeatBuffer;
use crate::batches::next_incomplete;
use crate::clock::Clock;
use crate::config::{SchedulerConfig, WeightComposition};
use crate::deck::DeckResolver;
use crate::error::SchedulerError;
use crate::models::{
    BatchMeta, DeckProgress, Difficulty, Direction, Outcome, SessionTotals, SetView, Timestamp,
    Word,
};
use crate::sampler::WeightedSampler;
use crate::state::{SchedulerState, StateSnapshot};

/// Picks cards, records answers and tracks study sets.
///
/// Single writer: hosts that share a scheduler across threads must wrap it
/// in a mutex, since each operation mutates several maps in sequence.
pub struct Scheduler<D, C> {
    config: SchedulerConfig,
    state: SchedulerState,
    sampler: WeightedSampler,
    decks: D,
    clock: C,
}

impl<D: DeckResolver, C: Clock> Scheduler<D, C> {
    pub fn new(config: SchedulerConfig, state: SchedulerState, decks: D, clock: C) -> Self {
        let mut anti_repeat = AntiRepeatBuffer::new(config.anti_repeat_capacity());
        for id in &state.session.recent_word_ids {
            anti_repeat.remember(id);
        }
        // A restored session continues instead of replaying its first draws.
        let seed = config
            .seed
            .map(|seed| seed.wrapping_add(state.session.totals.shown));
        let sampler = WeightedSampler::new(anti_repeat, seed);
        Self {
            config,
            state,
            sampler,
            decks,
            clock,
        }
    }

    /// Scheduler with no history.
    pub fn with_fresh_state(config: SchedulerConfig, decks: D, clock: C) -> Self {
        let state = SchedulerState::new(&config);
        Self::new(config, state, decks, clock)
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    pub fn into_state(self) -> SchedulerState {
        self.state
    }

    pub fn totals(&self) -> &SessionTotals {
        &self.state.session.totals
    }

    pub fn difficulty(&self) -> Difficulty {
        self.state.session.difficulty
    }

    pub fn stars(&self, word_id: &str) -> f64 {
        self.state.mastery.get_stars(word_id)
    }

    pub fn reverse_unlock_threshold(&self) -> f64 {
        self.config.reverse_unlock_threshold()
    }

    fn resolve(&self, deck_key: &str) -> Vec<Word> {
        let deck = self.decks.resolve_deck(deck_key);
        if deck.is_empty() {
            let err = SchedulerError::InvalidDeck(deck_key.to_string());
            tracing::warn!(%err, "degrading to empty result");
        }
        deck
    }

    /// Combined sampling weight of `word`.
    pub fn weight_for(&self, word: &Word, now: Timestamp) -> f64 {
        combined_weight(&self.config, &self.state, word, now)
    }

    /// Draw the next card from the active set of `deck_key`.
    ///
    /// Returns `None` only when the deck is empty or unknown.
    pub fn pick_next(&mut self, deck_key: &str) -> Option<Word> {
        let deck = self.resolve(deck_key);
        let slice = self.state.batches.deck_slice(deck_key, &deck);
        let now = self.clock.now_ms();

        let (config, state, sampler) = (&self.config, &self.state, &mut self.sampler);
        let previous = state.session.last_shown_word_id.as_deref();
        let word = sampler
            .pick(slice, previous, |w| combined_weight(config, state, w, now))?
            .clone();

        self.state.mastery.mark_seen(&word.id, now);
        self.state.session.last_shown_word_id = Some(word.id.clone());
        self.state.session.recent_word_ids = self
            .sampler
            .anti_repeat()
            .iter()
            .map(str::to_string)
            .collect();
        self.state.session.totals.shown += 1;
        tracing::debug!(deck_key, word_id = %word.id, "picked next card");
        Some(word)
    }

    /// Apply an answer to mastery and penalty history.
    pub fn record_answer(&mut self, word_id: &str, outcome: Outcome) {
        let now = self.clock.now_ms();
        match outcome {
            Outcome::Correct => {
                self.state.mastery.on_correct(word_id);
            }
            Outcome::Idk => {
                self.state.mastery.on_idk(word_id);
                self.state.penalties.on_idk(word_id, now);
            }
            Outcome::Wrong => {
                self.state.penalties.on_wrong(word_id, now);
            }
        }
        if outcome.is_error() {
            self.state.session.totals.errors += 1;
        }
        tracing::debug!(
            word_id,
            outcome = outcome.name(),
            stars = self.state.mastery.get_stars(word_id),
            "recorded answer"
        );
    }

    fn meta_for(&self, deck_key: &str, deck: &[Word]) -> BatchMeta {
        let mastery = &self.state.mastery;
        self.state
            .batches
            .batches_meta(deck_key, deck, |id| mastery.is_learned(id))
    }

    pub fn get_batch_meta(&self, deck_key: &str) -> BatchMeta {
        let deck = self.resolve(deck_key);
        self.meta_for(deck_key, &deck)
    }

    /// Words of the active set; the whole deck if that set is empty.
    pub fn get_deck_slice(&self, deck_key: &str) -> Vec<Word> {
        let deck = self.resolve(deck_key);
        self.state.batches.deck_slice(deck_key, &deck).to_vec()
    }

    /// Make set `index` active. Out-of-range indexes are clamped.
    pub fn set_batch_index(&mut self, deck_key: &str, index: i64) -> usize {
        let deck_len = self.resolve(deck_key).len();
        let active = self.state.batches.set_batch_index(deck_key, index, deck_len);
        tracing::info!(deck_key, active, "active set changed");
        active
    }

    /// Reset mastery and penalties of the words in one set. Returns the number
    /// of words whose history was cleared.
    pub fn clear_set_progress(&mut self, deck_key: &str, batch_index: i64) -> usize {
        let deck = self.resolve(deck_key);
        let index = match self.state.batches.checked_index(batch_index, deck.len()) {
            Ok(i) => i,
            Err(err) => {
                tracing::warn!(%err, deck_key, "nothing to clear");
                return 0;
            }
        };
        let words = self.state.batches.batch_words(index, &deck);
        let ids: Vec<&str> = words.iter().map(|w| w.id.as_str()).collect();
        let mastery = self.state.mastery.clear(ids.iter().copied());
        let penalties = self.state.penalties.clear(ids.iter().copied());
        tracing::info!(deck_key, batch_index = index, mastery, penalties, "cleared set progress");
        ids.len()
    }

    /// Words of the deck at maximum stars.
    pub fn learned_count(&self, deck_key: &str) -> usize {
        self.deck_progress(deck_key).learned
    }

    pub fn deck_progress(&self, deck_key: &str) -> DeckProgress {
        let deck = self.resolve(deck_key);
        let learned = deck
            .iter()
            .filter(|w| self.state.mastery.is_learned(&w.id))
            .count();
        DeckProgress {
            learned,
            total: deck.len(),
        }
    }

    /// Change difficulty mode, clearing the active set so statistics of the
    /// two modes do not mix. Returns `false` when the mode was already set.
    pub fn switch_difficulty(&mut self, deck_key: &str, difficulty: Difficulty) -> bool {
        if self.state.session.difficulty == difficulty {
            return false;
        }
        let deck_len = self.resolve(deck_key).len();
        let active = self.state.batches.get_batch_index(deck_key, deck_len);
        self.clear_set_progress(deck_key, active as i64);
        self.state.session.difficulty = difficulty;
        tracing::info!(deck_key, difficulty = difficulty.name(), "difficulty switched");
        true
    }

    /// Prompt direction for `word_id`.
    ///
    /// Unlocked words (stars at or above the reverse threshold) get the base
    /// reverse share; recent mistakes add their reverse probability on top.
    pub fn quiz_direction(&mut self, word_id: &str) -> Direction {
        let now = self.clock.now_ms();
        let unlocked = self.state.mastery.get_stars(word_id) >= self.config.reverse_unlock_threshold();
        let base = if unlocked { self.config.reverse_base_share } else { 0.0 };
        let p = base + self.state.penalties.reverse_prob_for(word_id, now);
        if self.sampler.chance(p) {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }

    fn view(&mut self, deck_key: &str, deck: &[Word], card: Option<Word>) -> SetView {
        let meta = self.meta_for(deck_key, deck);
        let (direction, stars) = match &card {
            Some(word) => (self.quiz_direction(&word.id), self.stars(&word.id)),
            None => (Direction::Forward, 0.0),
        };
        SetView {
            index: meta.active,
            meta,
            card,
            direction,
            stars,
        }
    }

    /// Activate set `index` and draw its first card.
    pub fn load_set(&mut self, deck_key: &str, index: i64) -> SetView {
        self.set_batch_index(deck_key, index);
        let card = self.pick_next(deck_key);
        let deck = self.resolve(deck_key);
        self.view(deck_key, &deck, card)
    }

    /// Record an answer, move on when the active set was just finished, and
    /// draw the next card.
    pub fn answer(&mut self, deck_key: &str, word_id: &str, outcome: Outcome) -> SetView {
        let deck = self.resolve(deck_key);
        let before = self.meta_for(deck_key, &deck);
        self.record_answer(word_id, outcome);
        let after = self.meta_for(deck_key, &deck);

        let active = after.active;
        let just_completed = after.completed[active] && !before.completed[active];
        if self.config.auto_advance && just_completed {
            if let Some(next) = next_incomplete(&after, active) {
                self.state.batches.set_batch_index(deck_key, next as i64, deck.len());
                tracing::info!(deck_key, from = active, to = next, "set complete, advancing");
            }
        }

        let card = self.pick_next(deck_key);
        self.view(deck_key, &deck, card)
    }
}

fn combined_weight(
    config: &SchedulerConfig,
    state: &SchedulerState,
    word: &Word,
    now: Timestamp,
) -> f64 {
    let mastery = state.mastery.weight_for(word, now);
    match config.weight_composition {
        WeightComposition::MasteryOnly => mastery,
        WeightComposition::Product => mastery * state.penalties.weight_for(&word.id, now),
    }
}
