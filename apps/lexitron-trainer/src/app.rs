//! Application state and command handling.

use crate::cli::Command;
use crate::config::Config;
use crate::db::Database;
use crate::decks::DirectoryDecks;
use lexitron_scheduler::{
    BatchMeta, Clock, DeckResolver, Direction, Scheduler, SchedulerState, SetView, StateBlobs,
    SystemClock,
};
use std::fmt::Write as _;

pub struct App<C: Clock = SystemClock> {
    pub config: Config,
    db: Database,
    scheduler: Scheduler<DirectoryDecks, C>,
}

impl App<SystemClock> {
    /// Open the configured database and decks directory.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let db = Database::open(&config.db_path())?;
        let decks = DirectoryDecks::new(config.decks_dir());
        Self::with_parts(config, db, decks, SystemClock)
    }
}

impl<C: Clock> App<C> {
    pub fn with_parts(config: Config, db: Database, decks: DirectoryDecks, clock: C) -> anyhow::Result<Self> {
        let blobs = db.load_blobs()?;
        let first_run = blobs.get(StateBlobs::SESSION).is_none();
        let (mut state, report) = SchedulerState::restore(&config.scheduler, &blobs);
        for err in &report.errors {
            tracing::warn!(%err, "state map was reset");
        }
        if first_run {
            state.session.difficulty = config.session.difficulty;
        }

        let scheduler = Scheduler::new(config.scheduler.clone(), state, decks, clock);
        Ok(Self {
            config,
            db,
            scheduler,
        })
    }

    pub fn scheduler(&self) -> &Scheduler<DirectoryDecks, C> {
        &self.scheduler
    }

    /// Persist the current state.
    pub fn save(&mut self) -> anyhow::Result<()> {
        self.db.save_snapshot(&self.scheduler.snapshot())?;
        Ok(())
    }

    fn deck_key(&self, deck: Option<&str>) -> String {
        deck.map(str::to_string)
            .unwrap_or_else(|| self.config.session.active_deck.clone())
    }

    /// Run one command and return its text output. State is saved after
    /// every command that changes it.
    pub fn execute(&mut self, deck: Option<&str>, command: &Command) -> anyhow::Result<String> {
        let deck_key = self.deck_key(deck);
        let output = match command {
            Command::Next => {
                let card = self.scheduler.pick_next(&deck_key);
                match card {
                    Some(word) => {
                        let direction = self.scheduler.quiz_direction(&word.id);
                        let stars = self.scheduler.stars(&word.id);
                        format_card(&word.id, &word.front, &word.back, direction, stars)
                    }
                    None => format!("Deck '{deck_key}' has no words.\n"),
                }
            }
            Command::Answer { word_id, outcome } => {
                let view = self.scheduler.answer(&deck_key, word_id, (*outcome).into());
                format_view(&view)
            }
            Command::Sets => {
                let meta = self.scheduler.get_batch_meta(&deck_key);
                let progress = self.scheduler.deck_progress(&deck_key);
                let mut out = format_meta(&meta);
                let _ = writeln!(out, "Learned: {}/{}", progress.learned, progress.total);
                out
            }
            Command::Slice => {
                let mut out = String::new();
                for word in self.scheduler.get_deck_slice(&deck_key) {
                    let _ = writeln!(
                        out,
                        "{:<12} {:<24} {:<24} {}",
                        word.id,
                        word.front,
                        word.back,
                        stars_label(self.scheduler.stars(&word.id), self.config.scheduler.stars_max())
                    );
                }
                out
            }
            Command::Select { index } => {
                let view = self.scheduler.load_set(&deck_key, *index);
                format_view(&view)
            }
            Command::Clear { index } => {
                let cleared = self.scheduler.clear_set_progress(&deck_key, *index);
                format!("Cleared progress for {cleared} words.\n")
            }
            Command::Difficulty { level } => {
                if self.scheduler.switch_difficulty(&deck_key, (*level).into()) {
                    format!(
                        "Difficulty set to {}; active set progress cleared.\n",
                        self.scheduler.difficulty().name()
                    )
                } else {
                    format!("Difficulty is already {}.\n", self.scheduler.difficulty().name())
                }
            }
            Command::Decks => {
                let decks = DirectoryDecks::new(self.config.decks_dir());
                let mut out = String::new();
                for key in decks.list_keys() {
                    let total = decks.resolve_deck(&key).len();
                    let progress = self.scheduler.deck_progress(&key);
                    let _ = writeln!(out, "{key:<20} {}/{} learned", progress.learned, total);
                }
                out
            }
            Command::Stats => {
                let scheduler = self.scheduler();
                let totals = scheduler.totals();
                format!(
                    "Shown: {}\nErrors: {}\nDifficulty: {}\n",
                    totals.shown,
                    totals.errors,
                    scheduler.difficulty().name()
                )
            }
        };

        if command.mutates() {
            self.save()?;
        }
        Ok(output)
    }
}

fn stars_label(stars: f64, max: f64) -> String {
    format!("{stars:.1}/{max:.0}")
}

fn format_card(id: &str, front: &str, back: &str, direction: Direction, stars: f64) -> String {
    let (prompt, answer) = match direction {
        Direction::Forward => (front, back),
        Direction::Reverse => (back, front),
    };
    format!("[{id}] {prompt}\n  -> {answer}\n  stars: {stars:.1}\n")
}

fn format_meta(meta: &BatchMeta) -> String {
    let flags: String = meta
        .completed
        .iter()
        .enumerate()
        .map(|(i, done)| {
            let mark = if *done { 'x' } else { ' ' };
            if i == meta.active {
                format!("<{mark}>")
            } else {
                format!("[{mark}]")
            }
        })
        .collect();
    format!("Set {}/{} {flags}\n", meta.active + 1, meta.total)
}

fn format_view(view: &SetView) -> String {
    let mut out = format_meta(&view.meta);
    match &view.card {
        Some(word) => out.push_str(&format_card(
            &word.id,
            &word.front,
            &word.back,
            view.direction,
            view.stars,
        )),
        None => out.push_str("No words in this deck.\n"),
    }
    out
}
