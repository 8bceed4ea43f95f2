//! Arbiter - command-line driver for the pairing engine.
//!
//! Keeps one tournament snapshot on disk and runs each engine operation
//! against it. Machine-readable output (rounds, standings, schedules) goes to
//! stdout as JSON; logs go to stderr.

mod config;
mod state;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use arbiter_core::{GameResult, PlayerId};
use arbiter_engine::{MasterSeed, RoundRequest, RoundRobinScheduler, Tournament};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arbiter")]
#[command(about = "Chess tournament pairing engine")]
struct Cli {
    /// Tournament configuration (TOML)
    #[arg(short, long, global = true, default_value_os_t = config::default_path())]
    config: PathBuf,
    /// Tournament snapshot (JSON)
    #[arg(short, long, global = true, default_value = "tournament.json")]
    state: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a roster and create a new snapshot
    Init {
        /// Roster file (JSON array of players)
        roster: PathBuf,
    },
    /// Generate the next round
    Pair {
        /// Players requesting a bye
        #[arg(long, value_delimiter = ',')]
        bye: Vec<u32>,
        /// Players known to be absent
        #[arg(long, value_delimiter = ',')]
        absent: Vec<u32>,
    },
    /// Record the result of one board
    Result {
        round: u32,
        table: u32,
        /// 1-0, 0-1, 1/2-1/2, +/-, -/+ or -/-
        #[arg(allow_hyphen_values = true)]
        result: GameResult,
    },
    /// Confirm a round and print the standings
    Confirm { round: u32 },
    /// Withdraw a player from future rounds
    Withdraw { player: u32 },
    /// Void a confirmed game
    Void { round: u32, table: u32 },
    /// Print the standings
    Standings,
    /// Print a round-robin schedule for players in seed order
    Schedule { players: Vec<u32> },
    /// Print a fresh master seed
    Seed,
}

/// One line of the standings table.
#[derive(Debug, Serialize)]
struct StandingRow {
    rank: usize,
    id: PlayerId,
    name: String,
    score: f64,
    tiebreaks: BTreeMap<&'static str, f64>,
}

fn standings(tournament: &Tournament) -> Vec<StandingRow> {
    let order = &tournament.config().tie_break_order;
    tournament
        .ranking()
        .into_iter()
        .enumerate()
        .filter_map(|(i, id)| {
            let player = tournament.standings().player(id)?;
            let tiebreaks = order
                .iter()
                .filter(|key| key.is_numeric())
                .map(|&key| (key.as_str(), tournament.tiebreaks().value(id, key)))
                .collect();
            Some(StandingRow {
                rank: i + 1,
                id,
                name: player.name.clone(),
                score: player.score,
                tiebreaks,
            })
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let snapshot = cli.state.as_path();
    match cli.command {
        Commands::Init { roster } => {
            let config = config::load(&cli.config)
                .with_context(|| format!("loading {}", cli.config.display()))?;
            let players = state::load_roster(&roster)?;
            let count = players.len();
            let tournament = Tournament::new(config, players)?;
            state::create(snapshot, &tournament)?;
            tracing::info!("Registered {} players in {}", count, snapshot.display());
            println!("{}", tournament.seed());
        }
        Commands::Pair { bye, absent } => {
            let mut tournament = state::load(snapshot)?;
            let mut request = RoundRequest::new();
            for id in bye {
                request = request.request_bye(PlayerId(id));
            }
            for id in absent {
                request = request.absent(PlayerId(id));
            }
            let round = tournament.generate_round(&request)?.clone();
            state::save(snapshot, &tournament)?;
            print_json(&round)?;
        }
        Commands::Result {
            round,
            table,
            result,
        } => {
            let mut tournament = state::load(snapshot)?;
            tournament.record_result(round, table, result)?;
            state::save(snapshot, &tournament)?;
            tracing::info!("Round {} table {}: {}", round, table, result);
        }
        Commands::Confirm { round } => {
            let mut tournament = state::load(snapshot)?;
            tournament.confirm_round(round)?;
            state::save(snapshot, &tournament)?;
            print_json(&standings(&tournament))?;
        }
        Commands::Withdraw { player } => {
            let mut tournament = state::load(snapshot)?;
            tournament.withdraw(PlayerId(player))?;
            state::save(snapshot, &tournament)?;
        }
        Commands::Void { round, table } => {
            let mut tournament = state::load(snapshot)?;
            tournament.void_game(round, table)?;
            state::save(snapshot, &tournament)?;
        }
        Commands::Standings => {
            let tournament = state::load(snapshot)?;
            print_json(&standings(&tournament))?;
        }
        Commands::Schedule { players } => {
            let seeds: Vec<PlayerId> = players.into_iter().map(PlayerId).collect();
            print_json(&RoundRobinScheduler::generate_schedule(&seeds)?)?;
        }
        Commands::Seed => println!("{}", MasterSeed::generate()),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    run(Cli::parse())
}
