//! Decks stored as JSON files, one per deck key.

use lexitron_scheduler::{DeckResolver, Word};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

/// Reads `<dir>/<deck_key>.json` (an array of `{ id, front, back }`).
/// Each deck is read once and cached for the life of the resolver.
pub struct DirectoryDecks {
    dir: PathBuf,
    cache: RefCell<HashMap<String, Vec<Word>>>,
}

impl DirectoryDecks {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Deck keys with a file in the directory, sorted.
    pub fn list_keys(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut keys: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        keys.sort();
        keys
    }

    fn load(&self, deck_key: &str) -> Vec<Word> {
        if deck_key.is_empty() || deck_key.contains(['/', '\\']) || deck_key.starts_with('.') {
            tracing::warn!(deck_key, "rejecting deck key");
            return Vec::new();
        }
        let path = self.dir.join(format!("{deck_key}.json"));
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "deck not readable");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Word>>(&content) {
            Ok(words) => words,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "deck not valid JSON");
                Vec::new()
            }
        }
    }
}

impl DeckResolver for DirectoryDecks {
    fn resolve_deck(&self, deck_key: &str) -> Vec<Word> {
        if let Some(words) = self.cache.borrow().get(deck_key) {
            return words.clone();
        }
        let words = self.load(deck_key);
        self.cache
            .borrow_mut()
            .insert(deck_key.to_string(), words.clone());
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_and_caches_deck() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("de.json"),
            r#"[{"id": "1", "front": "Hund", "back": "dog"}, {"id": "2", "front": "Katze", "back": "cat"}]"#,
        )
        .unwrap();

        let decks = DirectoryDecks::new(dir.path());
        let words = decks.resolve_deck("de");
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].back, "cat");

        std::fs::remove_file(dir.path().join("de.json")).unwrap();
        assert_eq!(decks.resolve_deck("de").len(), 2);
    }

    #[test]
    fn test_missing_or_invalid_deck_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ not a list").unwrap();

        let decks = DirectoryDecks::new(dir.path());
        assert!(decks.resolve_deck("bad").is_empty());
        assert!(decks.resolve_deck("missing").is_empty());
        assert!(decks.resolve_deck("../etc").is_empty());
        assert_eq!(decks.list_keys(), vec!["bad".to_string()]);
    }
}
