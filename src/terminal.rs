// src/terminal.rs
// This module handles terminal input/output for the Bingo game.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};

use crate::card::Card;
use crate::defs::{Number, COLUMN_HEADERS, FREE, announce};
use crate::game::{FinishReason, GameSession, GameState};
use crate::strategy::CellSet;

// Each cell is two characters wide plus one space of padding.
const CELL_WIDTH: usize = 3;

/// Format a single card cell with ANSI highlighting.
///
/// Winning cells are bold green, the ball just called is bold cyan, other
/// marked numbers are bold yellow. The free cell prints as `FR`.
pub fn format_cell(number: Number, marked: bool, last: bool, winning: bool) -> String {
    let text = if number == FREE {
        "FR".to_string()
    } else {
        format!("{number:2}")
    };

    if winning {
        format!("\x1b[1;32m{text}\x1b[0m")
    } else if last {
        format!("\x1b[1;36m{text}\x1b[0m")
    } else if marked {
        format!("\x1b[1;33m{text}\x1b[0m")
    } else {
        text
    }
}

/// Render a card as text, one line per row, under a B I N G O header.
pub fn render_card(card: &Card, last: Option<Number>, winning_cells: &CellSet) -> String {
    let header: String = COLUMN_HEADERS
        .iter()
        .take(card.cols())
        .map(|letter| format!("{letter:>2} "))
        .collect();

    let mut out = String::with_capacity((card.rows() + 1) * card.cols() * CELL_WIDTH * 4);
    out.push_str(header.trim_end());
    out.push('\n');

    for row in 0..card.rows() {
        let line: Vec<String> = (0..card.cols())
            .map(|col| {
                let number = card.number(row, col);
                format_cell(
                    number,
                    card.is_marked(row, col),
                    number != FREE && Some(number) == last,
                    winning_cells.contains(&(row, col)),
                )
            })
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }

    out
}

// Function to output the last n previous numbers, most recent first,
// without the ball that was just called
pub fn last_numbers(called: &[Number], n: usize) -> Vec<Number> {
    if called.len() <= 1 {
        return Vec::new();
    }

    let previous = &called[..called.len() - 1];
    previous.iter().rev().take(n).copied().collect()
}

pub fn show_on_terminal(session: &GameSession) {
    println!("Game {} - {}", session.id(), session.created_at_string());
    if let Some(strategy) = session.strategy() {
        println!("Winning pattern: \x1b[1m{}\x1b[0m", strategy.name());
    }

    match session.last_called() {
        Some(ball) => println!("Last number: \x1b[1;36m{}\x1b[0m", announce(ball)),
        None => println!("No balls called yet"),
    }
    println!("Previous numbers: {:?}", last_numbers(session.called_balls(), 5));

    let strategy = session.strategy();
    for handle in session.players() {
        let player = handle.borrow();
        println!("\n{}:", player.name());
        for (index, card) in player.cards().iter().enumerate() {
            let winning = strategy.map(|s| s.winning_cells(card)).unwrap_or_default();
            println!("Card {} [{}]", index + 1, card.id_string());
            print!("{}", render_card(card, session.last_called(), &winning));
        }
    }

    match session.state() {
        GameState::Finished(FinishReason::PlayerWon) => {
            if let Some(winner) = session.winner() {
                println!(
                    "\n\x1b[1;32mBINGO!!! {} wins with card {}\x1b[0m",
                    winner.player_name,
                    winner.card_index + 1
                );
            }
        }
        GameState::Finished(FinishReason::AllBallsDrawn) => {
            println!("\nThe drawer is empty! Nobody completed the pattern.");
        }
        GameState::NotStarted | GameState::InProgress => {
            println!("\nRemaining in drawer: {}", session.balls_remaining());
        }
    }

    println!();
}

/// Wait for a key press. Returns true if ESC was pressed.
pub fn hitkey() -> io::Result<bool> {
    println!("\nPress any key to continue or ESC to exit");

    // Enable raw mode to capture individual key presses
    enable_raw_mode()?;
    let result = wait_for_key();
    disable_raw_mode()?;
    let result = result?;

    print!("\x1Bc"); // Clear the screen
    if result {
        println!("Exiting the game.\n");
    }

    Ok(result)
}

fn wait_for_key() -> io::Result<bool> {
    // Clear any pending events in the buffer
    while event::poll(Duration::from_millis(0))? {
        event::read()?;
    }

    loop {
        if let Event::Key(key_event) = event::read()? {
            // Only process key press events, not key release events
            if key_event.kind == KeyEventKind::Press {
                return Ok(key_event.code == KeyCode::Esc);
            }
        }
    }
}
