//! Command-line interface.

use clap::{Parser, Subcommand, ValueEnum};
use lexitron_scheduler::{Difficulty, Outcome};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "lexitron-trainer", version, about = "Adaptive vocabulary trainer")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Deck key; defaults to the configured active deck.
    #[arg(short, long, global = true)]
    pub deck: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Draw the next card.
    Next,
    /// Record an answer and draw the next card.
    Answer {
        word_id: String,
        #[arg(value_enum)]
        outcome: AnswerArg,
    },
    /// Show set progress.
    Sets,
    /// List the words of the active set.
    Slice,
    /// Make a set active and draw its first card.
    Select { index: i64 },
    /// Reset progress of one set.
    Clear { index: i64 },
    /// Switch difficulty mode; clears the active set.
    Difficulty {
        #[arg(value_enum)]
        level: DifficultyArg,
    },
    /// List available decks.
    Decks,
    /// Show session totals.
    Stats,
}

impl Command {
    /// Whether the command changes persisted state.
    pub fn mutates(&self) -> bool {
        !matches!(self, Self::Sets | Self::Slice | Self::Decks | Self::Stats)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnswerArg {
    Correct,
    Idk,
    Wrong,
}

impl From<AnswerArg> for Outcome {
    fn from(arg: AnswerArg) -> Self {
        match arg {
            AnswerArg::Correct => Outcome::Correct,
            AnswerArg::Idk => Outcome::Idk,
            AnswerArg::Wrong => Outcome::Wrong,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DifficultyArg {
    Normal,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Normal => Difficulty::Normal,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        let cli = Cli::try_parse_from(["lexitron-trainer", "-d", "de", "answer", "w1", "idk"]).unwrap();
        assert_eq!(cli.deck.as_deref(), Some("de"));
        match cli.command {
            Command::Answer { word_id, outcome } => {
                assert_eq!(word_id, "w1");
                assert_eq!(Outcome::from(outcome), Outcome::Idk);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_negative_index_is_accepted() {
        let cli = Cli::try_parse_from(["lexitron-trainer", "select", "--", "-1"]).unwrap();
        assert!(matches!(cli.command, Command::Select { index: -1 }));
        assert!(cli.command.mutates());
    }

    #[test]
    fn test_read_only_commands() {
        let cli = Cli::try_parse_from(["lexitron-trainer", "sets", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(!cli.command.mutates());
    }
}
