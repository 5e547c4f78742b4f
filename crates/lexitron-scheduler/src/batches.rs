//! Study sets: fixed-size contiguous slices of a deck.

use crate::error::{SchedulerError, SchedulerResult};
use crate::models::{BatchMeta, Word};
use std::collections::HashMap;
use std::ops::Range;

/// Number of sets needed to cover `deck_len` words. Always at least 1.
pub fn total_batches(deck_len: usize, set_size: usize) -> usize {
    deck_len.div_ceil(set_size.max(1)).max(1)
}

/// Splits decks into sets and remembers the active set per deck key.
#[derive(Debug, Clone)]
pub struct BatchPaginator {
    set_size: usize,
    cursors: HashMap<String, usize>,
}

impl BatchPaginator {
    pub fn new(set_size: usize) -> Self {
        Self::from_cursors(set_size, HashMap::new())
    }

    pub fn from_cursors(set_size: usize, cursors: HashMap<String, usize>) -> Self {
        Self { set_size, cursors }
    }

    pub fn set_size(&self) -> usize {
        self.set_size
    }

    /// Persisted view.
    pub fn cursors(&self) -> &HashMap<String, usize> {
        &self.cursors
    }

    pub fn total_batches(&self, deck_len: usize) -> usize {
        total_batches(deck_len, self.set_size)
    }

    /// Word index range of set `index`, cut at the end of the deck.
    pub fn batch_range(&self, index: usize, deck_len: usize) -> Range<usize> {
        let start = index.saturating_mul(self.set_size).min(deck_len);
        let end = start.saturating_add(self.set_size).min(deck_len);
        start..end
    }

    /// Words of set `index`.
    pub fn batch_words<'a>(&self, index: usize, deck: &'a [Word]) -> &'a [Word] {
        &deck[self.batch_range(index, deck.len())]
    }

    /// Validate `index` against the set count for `deck_len`.
    pub fn checked_index(&self, index: i64, deck_len: usize) -> SchedulerResult<usize> {
        let total = self.total_batches(deck_len);
        usize::try_from(index)
            .ok()
            .filter(|i| *i < total)
            .ok_or(SchedulerError::OutOfRangeIndex { index, total })
    }

    fn clamp_index(&self, index: i64, deck_len: usize) -> usize {
        let total = self.total_batches(deck_len);
        match self.checked_index(index, deck_len) {
            Ok(i) => i,
            Err(err) => {
                tracing::debug!(%err, "clamping batch index");
                if index < 0 {
                    0
                } else {
                    total - 1
                }
            }
        }
    }

    /// Active set for `deck_key`, clamped into range for the current deck size.
    pub fn get_batch_index(&self, deck_key: &str, deck_len: usize) -> usize {
        let stored = self.cursors.get(deck_key).copied().unwrap_or(0);
        self.clamp_index(i64::try_from(stored).unwrap_or(i64::MAX), deck_len)
    }

    /// Make set `index` active. Returns the clamped index that was stored.
    pub fn set_batch_index(&mut self, deck_key: &str, index: i64, deck_len: usize) -> usize {
        let index = self.clamp_index(index, deck_len);
        self.cursors.insert(deck_key.to_string(), index);
        index
    }

    /// Set count, active set and completion flags.
    ///
    /// A set is complete when it has words and every one of them satisfies
    /// `is_learned`.
    pub fn batches_meta<F>(&self, deck_key: &str, deck: &[Word], is_learned: F) -> BatchMeta
    where
        F: Fn(&str) -> bool,
    {
        let total = self.total_batches(deck.len());
        let active = self.get_batch_index(deck_key, deck.len());
        let completed = (0..total)
            .map(|i| {
                let words = self.batch_words(i, deck);
                !words.is_empty() && words.iter().all(|w| is_learned(&w.id))
            })
            .collect();
        BatchMeta {
            total,
            active,
            completed,
        }
    }

    /// Words of the active set, or the whole deck when that set is empty.
    pub fn deck_slice<'a>(&self, deck_key: &str, deck: &'a [Word]) -> &'a [Word] {
        let active = self.get_batch_index(deck_key, deck.len());
        let slice = self.batch_words(active, deck);
        if slice.is_empty() {
            deck
        } else {
            slice
        }
    }
}

/// First incomplete set after `from`, wrapping around. `None` when all are done.
pub(crate) fn next_incomplete(meta: &BatchMeta, from: usize) -> Option<usize> {
    (1..=meta.total)
        .map(|offset| (from + offset) % meta.total)
        .find(|i| !meta.completed[*i])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(n: usize) -> Vec<Word> {
        (0..n)
            .map(|i| Word::new(format!("w{i}"), format!("f{i}"), format!("b{i}")))
            .collect()
    }

    #[test]
    fn test_total_batches() {
        assert_eq!(total_batches(10, 4), 3);
        assert_eq!(total_batches(8, 4), 2);
        assert_eq!(total_batches(0, 4), 1);
        assert_eq!(total_batches(1, 4), 1);
    }

    #[test]
    fn test_ranges_cover_deck() {
        let paginator = BatchPaginator::new(4);
        assert_eq!(paginator.batch_range(0, 10), 0..4);
        assert_eq!(paginator.batch_range(1, 10), 4..8);
        assert_eq!(paginator.batch_range(2, 10), 8..10);
        assert_eq!(paginator.batch_range(3, 10), 10..10);
    }

    #[test]
    fn test_set_batch_index_clamps() {
        let mut paginator = BatchPaginator::new(4);
        assert_eq!(paginator.set_batch_index("de", 7, 10), 2);
        assert_eq!(paginator.set_batch_index("de", -3, 10), 0);
        assert_eq!(paginator.set_batch_index("de", 1, 10), 1);
        assert_eq!(paginator.get_batch_index("de", 10), 1);
    }

    #[test]
    fn test_stale_cursor_after_resize() {
        let mut paginator = BatchPaginator::new(4);
        paginator.set_batch_index("de", 2, 10);
        assert_eq!(paginator.get_batch_index("de", 5), 1);
        assert_eq!(paginator.get_batch_index("de", 0), 0);
        assert_eq!(paginator.get_batch_index("unknown", 10), 0);
    }

    #[test]
    fn test_checked_index() {
        let paginator = BatchPaginator::new(4);
        assert_eq!(paginator.checked_index(2, 10), Ok(2));
        assert_eq!(
            paginator.checked_index(3, 10),
            Err(SchedulerError::OutOfRangeIndex { index: 3, total: 3 })
        );
    }

    #[test]
    fn test_meta_completion() {
        let words = deck(10);
        let paginator = BatchPaginator::new(4);
        let learned = ["w0", "w1", "w2", "w3", "w8"];
        let meta = paginator.batches_meta("de", &words, |id| learned.contains(&id));
        assert_eq!(meta.total, 3);
        assert_eq!(meta.active, 0);
        assert_eq!(meta.completed, vec![true, false, false]);
    }

    #[test]
    fn test_empty_deck_never_complete() {
        let paginator = BatchPaginator::new(4);
        let meta = paginator.batches_meta("de", &[], |_| true);
        assert_eq!(meta.total, 1);
        assert_eq!(meta.completed, vec![false]);
    }

    #[test]
    fn test_deck_slice() {
        let words = deck(10);
        let mut paginator = BatchPaginator::new(4);
        paginator.set_batch_index("de", 2, 10);
        let slice = paginator.deck_slice("de", &words);
        assert_eq!(slice.len(), 2);
        assert_eq!(slice[0].id, "w8");
        assert!(paginator.deck_slice("de", &[]).is_empty());
    }

    #[test]
    fn test_next_incomplete_wraps() {
        let meta = BatchMeta {
            total: 3,
            active: 2,
            completed: vec![false, true, true],
        };
        assert_eq!(next_incomplete(&meta, 2), Some(0));
        assert_eq!(next_incomplete(&meta, 0), Some(0));

        let done = BatchMeta {
            total: 2,
            active: 0,
            completed: vec![true, true],
        };
        assert_eq!(next_incomplete(&done, 0), None);
    }
}
