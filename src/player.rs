// src/player.rs
// A player: a name and the cards they play with.

use crate::card::Card;
use crate::defs::Number;
use crate::notify::BallListener;
use crate::strategy::WinStrategy;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    name: String,
    cards: Vec<Card>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Player {
            name: name.into(),
            cards: Vec::new(),
        }
    }

    pub fn with_cards(name: impl Into<String>, cards: Vec<Card>) -> Self {
        Player {
            name: name.into(),
            cards,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// Mark `ball` on every card. Returns how many cards had it.
    pub fn mark(&mut self, ball: Number) -> usize {
        self.cards.iter_mut().map(|card| card.mark(ball)).filter(|&hit| hit).count()
    }

    /// Index of the first card satisfying `strategy`.
    pub fn winning_card(&self, strategy: WinStrategy) -> Option<usize> {
        self.cards.iter().position(|card| strategy.check_win(card))
    }

    pub fn has_bingo(&self, strategy: WinStrategy) -> bool {
        self.winning_card(strategy).is_some()
    }

    pub(crate) fn clear_marks(&mut self) {
        for card in &mut self.cards {
            card.clear_marks();
        }
    }
}

impl BallListener for Player {
    fn on_ball_called(&mut self, ball: Number) {
        self.mark(ball);
    }
}
