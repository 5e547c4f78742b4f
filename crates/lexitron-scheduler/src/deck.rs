//! Deck resolution.

use crate::models::Word;
use std::collections::HashMap;

/// Supplies decks by key. Order must be stable within a session.
pub trait DeckResolver {
    /// Words of the deck, or an empty list for unknown keys.
    fn resolve_deck(&self, deck_key: &str) -> Vec<Word>;
}

/// Decks held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDecks {
    decks: HashMap<String, Vec<Word>>,
}

impl InMemoryDecks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a deck.
    pub fn with_deck(mut self, key: impl Into<String>, words: Vec<Word>) -> Self {
        self.insert(key, words);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, words: Vec<Word>) {
        self.decks.insert(key.into(), words);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.decks.keys().map(String::as_str)
    }
}

impl DeckResolver for InMemoryDecks {
    fn resolve_deck(&self, deck_key: &str) -> Vec<Word> {
        self.decks.get(deck_key).cloned().unwrap_or_default()
    }
}

impl<R: DeckResolver + ?Sized> DeckResolver for &R {
    fn resolve_deck(&self, deck_key: &str) -> Vec<Word> {
        (**self).resolve_deck(deck_key)
    }
}
