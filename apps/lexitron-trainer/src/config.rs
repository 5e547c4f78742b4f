//! Configuration for the vocabulary trainer.

use lexitron_scheduler::{Difficulty, SchedulerConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::config_path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default()
    }

    /// Load from `path`. A missing or malformed file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("", "", "lexitron")
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|d| d.config_dir().join("config.toml"))
    }

    /// Database file: configured path, else the platform data dir.
    pub fn db_path(&self) -> PathBuf {
        self.storage
            .database
            .clone()
            .or_else(|| Self::project_dirs().map(|d| d.data_dir().join("lexitron.db")))
            .unwrap_or_else(|| "lexitron.db".into())
    }

    /// Directory of `<deck_key>.json` files.
    pub fn decks_dir(&self) -> PathBuf {
        self.storage
            .decks_dir
            .clone()
            .or_else(|| Self::project_dirs().map(|d| d.data_dir().join("decks")))
            .unwrap_or_else(|| "decks".into())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub database: Option<PathBuf>,
    #[serde(default)]
    pub decks_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Deck used when a command omits one.
    #[serde(default = "default_deck")]
    pub active_deck: String,
    /// Difficulty applied on first run.
    #[serde(default)]
    pub difficulty: Difficulty,
}

fn default_deck() -> String { "de_verbs".to_string() }

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            active_deck: default_deck(),
            difficulty: Difficulty::Normal,
        }
    }
}
