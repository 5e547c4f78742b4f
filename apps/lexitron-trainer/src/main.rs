//! Lexitron Trainer - adaptive vocabulary drills from the command line.

mod app;
mod cli;
mod config;
mod db;
mod decks;

use app::App;
use clap::Parser;
use cli::Cli;
use config::Config;
use tracing::Level;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => {
            let config = Config::load();
            if Config::config_path().is_some_and(|p| !p.exists()) {
                if let Err(e) = config.save() {
                    tracing::warn!(error = %e, "could not write default config");
                }
            }
            config
        }
    };

    let mut app = App::new(config)?;
    let output = app.execute(cli.deck.as_deref(), &cli.command)?;
    print!("{output}");

    Ok(())
}
