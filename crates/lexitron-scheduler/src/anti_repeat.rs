//! Bounded history of recently shown words.

use crate::models::{Word, WordId};
use std::collections::VecDeque;

/// The last few shown word ids, oldest first, without duplicates.
#[derive(Debug, Clone)]
pub struct AntiRepeatBuffer {
    capacity: usize,
    recent: VecDeque<WordId>,
}

impl AntiRepeatBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            recent: VecDeque::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    pub fn contains(&self, word_id: &str) -> bool {
        self.recent.iter().any(|id| id == word_id)
    }

    /// Ids from oldest to most recent.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.recent.iter().map(String::as_str)
    }

    /// Push to the tail, moving an existing entry instead of duplicating it.
    pub fn remember(&mut self, word_id: &str) {
        if let Some(pos) = self.recent.iter().position(|id| id == word_id) {
            self.recent.remove(pos);
        }
        self.recent.push_back(word_id.to_string());
        while self.recent.len() > self.capacity {
            self.recent.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.recent.clear();
    }

    /// Drop recently shown words from `pool`. Returns the whole pool when
    /// nothing would be left.
    pub fn filter_candidates<'a>(&self, pool: &'a [Word]) -> Vec<&'a Word> {
        let filtered: Vec<&Word> = pool.iter().filter(|w| !self.contains(&w.id)).collect();
        if filtered.is_empty() {
            pool.iter().collect()
        } else {
            filtered
        }
    }
}
