// src/config.rs
// Game configuration loaded from a simple key = value file, plus roster parsing
// for the command line.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::defs::{Number, FIRSTNUMBER, LASTNUMBER};
use crate::error::{BingoError, Result};
use crate::logging::{log_info, log_warning, LogLevel};
use crate::strategy::WinStrategy;

pub const DEFAULT_CONFIG_PATH: &str = "conf/bingo.conf";

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub min_ball: Number,
    pub max_ball: Number,
    pub cards_per_player: usize,
    pub round_delay_ms: u64,
    /// None means a random pick at session start.
    pub strategy: Option<WinStrategy>,
    pub seed: Option<u64>,
    pub log_level: LogLevel,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_ball: FIRSTNUMBER,
            max_ball: LASTNUMBER,
            cards_per_player: 1,
            round_delay_ms: 500,
            strategy: None,
            seed: None,
            log_level: LogLevel::Info,
        }
    }
}

impl GameConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_map(&parse_config(&content)))
    }

    fn from_map(config_map: &HashMap<String, String>) -> Self {
        let defaults = Self::default();

        let min_ball = config_map.get("min_ball")
            .and_then(|v| v.parse::<Number>().ok())
            .unwrap_or(defaults.min_ball);

        let max_ball = config_map.get("max_ball")
            .and_then(|v| v.parse::<Number>().ok())
            .unwrap_or(defaults.max_ball);

        let cards_per_player = config_map.get("cards_per_player")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&count| count > 0)
            .unwrap_or(defaults.cards_per_player);

        let round_delay_ms = config_map.get("round_delay_ms")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.round_delay_ms);

        // "random" or an unknown name leaves the choice to the session
        let strategy = config_map.get("strategy").and_then(|v| match v.parse::<WinStrategy>() {
            Ok(strategy) => Some(strategy),
            Err(e) => {
                if !v.eq_ignore_ascii_case("random") {
                    log_warning(&format!("{e}, a random strategy will be used"));
                }
                None
            }
        });

        let seed = config_map.get("seed").and_then(|v| v.parse::<u64>().ok());

        let log_level = config_map.get("log_level")
            .and_then(|v| v.parse::<LogLevel>().ok())
            .unwrap_or(defaults.log_level);

        GameConfig { min_ball, max_ball, cards_per_player, round_delay_ms, strategy, seed, log_level }
    }

    pub fn load_or_default() -> Self {
        Self::load_or_default_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_or_default_from<P: AsRef<Path>>(path: P) -> Self {
        let config_path = path.as_ref();

        match Self::from_file(config_path) {
            Ok(config) => {
                log_info(&format!("Loaded configuration from {}", config_path.display()));
                config
            }
            Err(e) => {
                log_warning(&format!(
                    "Could not load config from {}: {}. Using defaults.",
                    config_path.display(),
                    e
                ));
                Self::default()
            }
        }
    }
}

fn parse_config(content: &str) -> HashMap<String, String> {
    let mut config = HashMap::new();

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            config.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    config
}

/// Parse a roster entry of the form `NAME` or `NAME:CARDS`.
pub fn parse_roster_entry(entry: &str, default_cards: usize) -> Result<(String, usize)> {
    let invalid = || BingoError::InvalidRosterEntry(entry.to_string());

    let (name, cards) = match entry.rsplit_once(':') {
        Some((name, count)) => {
            let count = count.trim().parse::<usize>().map_err(|_| invalid())?;
            (name.trim(), count)
        }
        None => (entry.trim(), default_cards),
    };

    if name.is_empty() || cards == 0 {
        return Err(invalid());
    }
    Ok((name.to_string(), cards))
}
