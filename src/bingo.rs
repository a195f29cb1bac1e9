// src/bingo.rs
// Command line Bingo: assemble a roster, pick a pattern and call balls until
// somebody completes it or the drawer runs dry.
//
// Interactive Controls:
// - any key: call the next ball
// - ESC: exit
//
// With --auto the balls are called on a timer; --json plays the whole game
// silently and prints the final snapshot.

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::time::sleep;

use bingo::config::{parse_roster_entry, GameConfig};
use bingo::game::{GameSession, SessionBuilder};
use bingo::logging::{log_error_stderr, set_log_level, LogLevel};
use bingo::strategy::WinStrategy;
use bingo::terminal;

#[derive(Parser)]
#[command(name = env!("CARGO_BIN_NAME"))]
#[command(about = "Bingo - call balls until a player completes the winning pattern")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Player to register, as NAME or NAME:CARDS (repeatable)
    #[arg(short, long = "player", value_name = "NAME[:CARDS]")]
    players: Vec<String>,

    /// Cards per player when the entry does not say (default from config)
    #[arg(long)]
    cards: Option<usize>,

    /// Winning pattern: horizontal, vertical, diagonal, l-shape, x-shape or random
    #[arg(short, long)]
    strategy: Option<String>,

    /// Seed for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// Call balls automatically instead of waiting for a key press
    #[arg(long)]
    auto: bool,

    /// Milliseconds between balls in --auto mode (default from config)
    #[arg(long)]
    delay: Option<u64>,

    /// Play the whole game and print the final state as JSON
    #[arg(long)]
    json: bool,

    /// Configuration file to use instead of conf/bingo.conf
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn build_session(args: &Args, config: &GameConfig) -> Result<GameSession, Box<dyn Error>> {
    let mut builder = SessionBuilder::from_config(config);

    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }

    if let Some(name) = &args.strategy {
        if !name.eq_ignore_ascii_case("random") {
            builder = builder.strategy(name.parse::<WinStrategy>()?);
        }
    }

    let default_cards = args.cards.unwrap_or(config.cards_per_player);
    if args.players.is_empty() {
        builder = builder.player("Player 1", default_cards);
    }
    for entry in &args.players {
        let (name, cards) = parse_roster_entry(entry, default_cards)?;
        builder = builder.player(name, cards);
    }

    Ok(builder.build()?)
}

// Level forced by the command line, if any. Applied before the config is read
// so --json output stays clean.
fn forced_log_level(args: &Args) -> Option<LogLevel> {
    if args.json {
        Some(LogLevel::Error)
    } else if args.quiet {
        Some(LogLevel::Warning)
    } else {
        None
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let forced_level = forced_log_level(&args);
    if let Some(level) = forced_level {
        set_log_level(level);
    }

    let config = match &args.config {
        Some(path) => GameConfig::load_or_default_from(path),
        None => GameConfig::load_or_default(),
    };
    set_log_level(forced_level.unwrap_or(config.log_level));

    let mut session = build_session(&args, &config)?;

    if args.json {
        session.play_until_finished()?;
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
        return Ok(());
    }

    let delay = Duration::from_millis(args.delay.unwrap_or(config.round_delay_ms));
    terminal::show_on_terminal(&session);

    loop {
        if args.auto {
            sleep(delay).await;
        } else if terminal::hitkey()? {
            break;
        }

        let report = session.advance()?;
        terminal::show_on_terminal(&session);

        if report.is_game_over() {
            break;
        }
    }

    println!("{}", session.game_info());
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        log_error_stderr(&format!("{e}"));
        std::process::exit(1);
    }
}
