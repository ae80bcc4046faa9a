mod terminal;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use countries_client::CountriesClient;
use geoduel_common::config::TimingsConfig;
use geoduel_common::{share_text, GameConfig, GameMode};
use geoduel_engine::{
    report_in_background, DataProvider, FileStore, Game, GameSettings, Phase, ScoreStore,
    Scheduler, Shuffler, TimerScheduler,
};
use score_sync_client::ScoreSyncClient;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::terminal::{parse_command, Command, TerminalSink, HELP};

/// Game crates plus the two HTTP clients, whose targets don't share the prefix.
const DEFAULT_LOG_FILTER: &str = "geoduel=info,countries_client=info,score_sync_client=info";

#[derive(Parser)]
#[command(name = "geoduel", about = "Guess which country has the higher population, area, or GDP")]
struct Cli {
    /// Path to config TOML file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Starting mode: population, area, or gdp
    #[arg(long, default_value = "population")]
    mode: GameMode,

    /// Fixed shuffle seed
    #[arg(long)]
    seed: Option<u64>,

    /// Skip every pacing delay
    #[arg(long)]
    no_delay: bool,

    /// Print events as JSON lines instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = GameConfig::load(cli.config.as_deref())?;
    if cli.no_delay {
        config.timings = TimingsConfig::instant();
    }
    config.log_summary();

    // Data
    let client = CountriesClient::new(
        &config.sources.countries_url,
        &config.sources.gdp_url,
        config.sources.request_timeout(),
    )
    .context("Failed to build HTTP client")?;
    let provider = DataProvider::new(client, config.filters.clone());

    println!("Loading countries...");
    tokio::time::sleep(config.timings.loading_delay()).await;
    let roster = provider
        .load()
        .await
        .context("Could not load country data. Check your connection and run again")?;

    // Collaborators
    let scores = ScoreStore::with_prefix(
        FileStore::new(&config.scores.store_path),
        &config.scores.key_prefix,
    );
    let shuffler = cli.seed.map_or_else(Shuffler::from_os_rng, Shuffler::seeded);
    let sync = match config.scores.sync_url.as_deref() {
        Some(url) => Some(Arc::new(
            ScoreSyncClient::new(url).context("Failed to build score sync client")?,
        )),
        None => None,
    };

    let mut game = Game::new(
        GameSettings::from_config(&config, cli.mode),
        TimerScheduler::new(),
        scores,
        TerminalSink::new(cli.json),
        shuffler,
    );

    println!("{HELP}");
    game.start(roster);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let waiting = game.scheduler().pending() > 0;
        let before = game.phase();

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match parse_command(&line) {
                    Command::Guess { higher } => {
                        game.guess(higher);
                    }
                    Command::PlayAgain => {
                        game.restart();
                    }
                    Command::Mode(mode) => {
                        if !game.change_mode(mode) {
                            println!("Already playing {mode}.");
                        }
                    }
                    Command::Share => {
                        if let Some(session) = game.session() {
                            println!("{}", share_text(session.score(), session.mode()));
                        }
                    }
                    Command::Help => println!("{HELP}"),
                    Command::Quit => break,
                    Command::Unknown(raw) => println!("Unknown command {raw:?}. Type ? for help."),
                }
            }
            true = game.step(), if waiting => {
                if before != Phase::GameOver && game.phase() == Phase::GameOver {
                    if let Some(client) = &sync {
                        let handle = report_in_background(Arc::clone(client), game.high_scores());
                        tokio::spawn(async move {
                            if let Ok(Some(message)) = handle.await {
                                println!("{message}");
                            }
                        });
                    }
                }
            }
        }
    }

    tracing::info!(high_scores = ?game.high_scores(), "Exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_covers_client_crates() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
        let directives: Vec<&str> = DEFAULT_LOG_FILTER.split(',').collect();
        for target in ["geoduel", "countries_client", "score_sync_client"] {
            assert!(directives.contains(&format!("{target}=info").as_str()), "{target} missing");
        }
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from(["geoduel", "--mode", "gdp", "--seed", "7", "--no-delay"]).unwrap();
        assert_eq!(cli.mode, GameMode::Gdp);
        assert_eq!(cli.seed, Some(7));
        assert!(cli.no_delay);
        assert!(!cli.json);
    }
}
