// src/card.rs
// This module holds the Bingo card (numbers plus marked flags) and the generator
// that hands out cards with unique ids.

use crate::defs::{Number, CARDCONFIG, COLUMN_RANGES, FREE, NUMBERSPERCOLUMN};
use crate::error::{BingoError, Result};
use crate::logging::{log_debug, log_warning};

use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A grid of numbers with a parallel grid of marked flags.
///
/// On a standard 5x5 card the center cell holds [`FREE`], starts marked and is
/// never matched against a ball. Marks only ever go from false to true while a
/// game is running.
///
/// Deserialized cards go through the same shape checks as [`Card::from_numbers`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CardData")]
pub struct Card {
    rows: usize,
    cols: usize,
    numbers: Vec<Vec<Number>>,
    marked: Vec<Vec<bool>>,
}

impl Card {
    /// Build a card filled by the B-I-N-G-O column rules.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        Self::with_rng(rows, cols, &mut rand::rng())
    }

    /// Same as [`Card::new`] with a caller-provided random source.
    pub fn with_rng<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Result<Self> {
        if rows == 0 || cols == 0 || cols > COLUMN_RANGES.len() || rows > NUMBERSPERCOLUMN as usize {
            return Err(BingoError::InvalidDimensions { rows, cols });
        }
        Ok(Self::fill_columns(rows, cols, rng))
    }

    // Caller guarantees the shape fits the column ranges.
    fn fill_columns<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let mut card = Self::blank(rows, cols);
        for col in 0..cols {
            let (min, max) = COLUMN_RANGES[col];
            let mut available: Vec<Number> = (min..=max).collect();
            available.shuffle(rng);

            // rows <= NUMBERSPERCOLUMN, so the column never runs dry
            let mut picks = available.into_iter();
            for row in 0..rows {
                card.numbers[row][col] = if card.is_free_cell(row, col) {
                    FREE
                } else {
                    picks.next().unwrap_or(FREE)
                };
            }
        }
        card
    }

    /// Build a card from a row-major list of numbers.
    ///
    /// The free cell of a 5x5 card is still marked, whatever value the list
    /// puts there.
    pub fn from_numbers(numbers: &[Number], rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(BingoError::InvalidDimensions { rows, cols });
        }
        let expected = rows * cols;
        if numbers.len() != expected {
            return Err(BingoError::InvalidNumberCount { expected, actual: numbers.len() });
        }

        let mut card = Self::blank(rows, cols);
        for (row, chunk) in numbers.chunks(cols).enumerate() {
            card.numbers[row].copy_from_slice(chunk);
        }
        Ok(card)
    }

    /// Build a card of `rows * cols` distinct numbers drawn from `min..=max`,
    /// ignoring the column rules.
    pub fn from_range<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        min: Number,
        max: Number,
        rng: &mut R,
    ) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(BingoError::InvalidDimensions { rows, cols });
        }
        if min > max || ((max - min) as usize + 1) < rows * cols {
            return Err(BingoError::InvalidRange { min, max });
        }

        let mut all_numbers: Vec<Number> = (min..=max).collect();
        all_numbers.shuffle(rng);
        all_numbers.truncate(rows * cols);
        Self::from_numbers(&all_numbers, rows, cols)
    }

    fn blank(rows: usize, cols: usize) -> Self {
        let mut card = Card {
            rows,
            cols,
            numbers: vec![vec![FREE; cols]; rows],
            marked: vec![vec![false; cols]; rows],
        };
        if card.is_standard() {
            card.marked[CARDCONFIG.free_row][CARDCONFIG.free_col] = true;
        }
        card
    }

    /// Whether this card has the standard 5x5 shape (and therefore a free cell).
    pub fn is_standard(&self) -> bool {
        self.rows == CARDCONFIG.rows && self.cols == CARDCONFIG.cols
    }

    pub fn is_free_cell(&self, row: usize, col: usize) -> bool {
        self.is_standard() && row == CARDCONFIG.free_row && col == CARDCONFIG.free_col
    }

    /// Mark the first cell holding `ball`. Returns false, leaving the card
    /// untouched, when the ball is not on the card.
    pub fn mark(&mut self, ball: Number) -> bool {
        for row in 0..self.rows {
            for col in 0..self.cols {
                if self.is_free_cell(row, col) {
                    continue;
                }
                if self.numbers[row][col] == ball {
                    self.marked[row][col] = true;
                    return true;
                }
            }
        }
        false
    }

    pub fn contains(&self, ball: Number) -> bool {
        (0..self.rows).any(|row| {
            (0..self.cols).any(|col| !self.is_free_cell(row, col) && self.numbers[row][col] == ball)
        })
    }

    pub fn is_marked(&self, row: usize, col: usize) -> bool {
        self.marked[row][col]
    }

    pub fn number(&self, row: usize, col: usize) -> Number {
        self.numbers[row][col]
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn numbers(&self) -> &[Vec<Number>] {
        &self.numbers
    }

    pub fn marked(&self) -> &[Vec<bool>] {
        &self.marked
    }

    pub fn marked_count(&self) -> usize {
        self.marked.iter().flatten().filter(|&&is_marked| is_marked).count()
    }

    /// Drop every mark except the free cell. Only used between games.
    pub(crate) fn clear_marks(&mut self) {
        for row in &mut self.marked {
            row.fill(false);
        }
        if self.is_standard() {
            self.marked[CARDCONFIG.free_row][CARDCONFIG.free_col] = true;
        }
    }

    /// Content hash of the card numbers, used as the card id.
    pub fn id(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        hasher.write_usize(self.rows);
        hasher.write_usize(self.cols);
        for number in self.numbers.iter().flatten() {
            hasher.write_u8(*number);
        }
        hasher.finish()
    }

    /// Card id formatted the way it is shown to players.
    pub fn id_string(&self) -> String {
        format!("{:016X}", self.id())
    }
}

// Unchecked wire form of a card.
#[derive(Deserialize)]
struct CardData {
    rows: usize,
    cols: usize,
    numbers: Vec<Vec<Number>>,
    marked: Vec<Vec<bool>>,
}

fn grid_fits<T>(grid: &[Vec<T>], rows: usize, cols: usize) -> bool {
    grid.len() == rows && grid.iter().all(|row| row.len() == cols)
}

impl TryFrom<CardData> for Card {
    type Error = BingoError;

    fn try_from(data: CardData) -> Result<Self> {
        let CardData { rows, cols, numbers, marked } = data;
        if rows == 0 || cols == 0 {
            return Err(BingoError::InvalidDimensions { rows, cols });
        }

        let expected = rows * cols;
        for grid_size in [numbers.iter().map(Vec::len).sum::<usize>(), marked.iter().map(Vec::len).sum::<usize>()] {
            if grid_size != expected {
                return Err(BingoError::InvalidNumberCount { expected, actual: grid_size });
            }
        }
        if !grid_fits(&numbers, rows, cols) || !grid_fits(&marked, rows, cols) {
            return Err(BingoError::InvalidDimensions { rows, cols });
        }

        let mut card = Card { rows, cols, numbers, marked };
        if card.is_standard() {
            card.marked[CARDCONFIG.free_row][CARDCONFIG.free_col] = true;
        }
        Ok(card)
    }
}

/// Hands out standard cards whose ids are unique for the generator's lifetime.
#[derive(Debug, Clone)]
pub struct CardGenerator {
    rng: StdRng,
    issued_ids: HashSet<u64>,
}

impl CardGenerator {
    const MAX_RETRIES: usize = 100;

    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Generator with reproducible output.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            issued_ids: HashSet::new(),
        }
    }

    /// A fresh standard 5x5 card with an id not handed out before.
    pub fn standard_card(&mut self) -> Card {
        let mut attempt = 0;

        loop {
            attempt += 1;
            let card = Card::fill_columns(CARDCONFIG.rows, CARDCONFIG.cols, &mut self.rng);

            let id = card.id();
            if self.issued_ids.insert(id) {
                return card;
            }

            if attempt >= Self::MAX_RETRIES {
                log_warning(&format!(
                    "Could not generate a unique card id after {} attempts, reusing {:016X}",
                    Self::MAX_RETRIES,
                    id
                ));
                return card;
            }

            log_debug(&format!("Duplicate card id {id:016X} detected, regenerating (attempt {attempt})"));
        }
    }

    /// A card of distinct numbers from an arbitrary range.
    pub fn range_card(&mut self, rows: usize, cols: usize, min: Number, max: Number) -> Result<Card> {
        let card = Card::from_range(rows, cols, min, max, &mut self.rng)?;
        self.issued_ids.insert(card.id());
        Ok(card)
    }

    /// Generate `count` standard cards with pairwise distinct ids.
    pub fn generate_cards(&mut self, count: usize) -> Vec<Card> {
        (0..count).map(|_| self.standard_card()).collect()
    }

    pub fn issued_count(&self) -> usize {
        self.issued_ids.len()
    }
}

impl Default for CardGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::WinStrategy;

    const SCENARIO_CARD: [Number; 25] = [
        5, 20, 34, 50, 70,
        12, 29, 41, 55, 65,
        3, 16, 0, 59, 72,
        9, 22, 38, 47, 61,
        1, 17, 33, 49, 63,
    ];

    #[test]
    fn test_standard_card_columns_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let card = Card::with_rng(5, 5, &mut rng).unwrap();
            for col in 0..5 {
                let (min, max) = COLUMN_RANGES[col];
                for row in 0..5 {
                    if card.is_free_cell(row, col) {
                        assert_eq!(card.number(row, col), FREE);
                        continue;
                    }
                    let number = card.number(row, col);
                    assert!(number >= min && number <= max, "{number} outside {min}..={max}");
                }
            }
        }
    }

    #[test]
    fn test_standard_card_values_distinct() {
        let card = Card::new(5, 5).unwrap();
        let values: HashSet<Number> = (0..5)
            .flat_map(|row| (0..5).map(move |col| (row, col)))
            .filter(|&(row, col)| !card.is_free_cell(row, col))
            .map(|(row, col)| card.number(row, col))
            .collect();
        assert_eq!(values.len(), 24);
    }

    #[test]
    fn test_free_cell_premarked() {
        let card = Card::new(5, 5).unwrap();
        assert!(card.is_marked(2, 2));
        assert_eq!(card.marked_count(), 1);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert_eq!(Card::new(0, 5), Err(BingoError::InvalidDimensions { rows: 0, cols: 5 }));
        assert_eq!(Card::new(5, 6), Err(BingoError::InvalidDimensions { rows: 5, cols: 6 }));
        assert_eq!(Card::new(16, 5), Err(BingoError::InvalidDimensions { rows: 16, cols: 5 }));
    }

    #[test]
    fn test_non_standard_generated_card_has_no_free_cell() {
        let card = Card::new(3, 4).unwrap();
        assert_eq!(card.rows(), 3);
        assert_eq!(card.cols(), 4);
        assert_eq!(card.marked_count(), 0);
        assert!((0..3).all(|row| (0..4).all(|col| card.number(row, col) != FREE)));
    }

    #[test]
    fn test_from_numbers_row_major() {
        let card = Card::from_numbers(&SCENARIO_CARD, 5, 5).unwrap();
        assert_eq!(card.number(0, 0), 5);
        assert_eq!(card.number(0, 4), 70);
        assert_eq!(card.number(1, 0), 12);
        assert_eq!(card.number(4, 4), 63);
        assert!(card.is_marked(2, 2));
    }

    #[test]
    fn test_from_numbers_wrong_count() {
        let result = Card::from_numbers(&SCENARIO_CARD[..24], 5, 5);
        assert_eq!(result, Err(BingoError::InvalidNumberCount { expected: 25, actual: 24 }));
    }

    #[test]
    fn test_mark_present_ball_marks_only_that_cell() {
        let mut card = Card::from_numbers(&SCENARIO_CARD, 5, 5).unwrap();
        assert!(card.mark(41));
        for row in 0..5 {
            for col in 0..5 {
                let expected = (row, col) == (1, 2) || card.is_free_cell(row, col);
                assert_eq!(card.is_marked(row, col), expected, "cell ({row}, {col})");
            }
        }
    }

    #[test]
    fn test_mark_absent_ball_is_noop() {
        let mut card = Card::from_numbers(&SCENARIO_CARD, 5, 5).unwrap();
        let before = card.clone();
        assert!(!card.mark(75));
        assert_eq!(card, before);
    }

    #[test]
    fn test_mark_is_idempotent() {
        let mut card = Card::from_numbers(&SCENARIO_CARD, 5, 5).unwrap();
        assert!(card.mark(5));
        assert!(card.mark(5));
        assert_eq!(card.marked_count(), 2);
    }

    #[test]
    fn test_mark_never_matches_free_cell() {
        let mut numbers = SCENARIO_CARD;
        numbers[12] = 44;
        let mut card = Card::from_numbers(&numbers, 5, 5).unwrap();
        assert!(!card.mark(44));
        assert!(!card.mark(FREE));
        assert!(!card.contains(44));
        assert_eq!(card.marked_count(), 1);
    }

    #[test]
    fn test_clear_marks_keeps_free_cell() {
        let mut card = Card::from_numbers(&SCENARIO_CARD, 5, 5).unwrap();
        card.mark(5);
        card.mark(63);
        card.clear_marks();
        assert_eq!(card.marked_count(), 1);
        assert!(card.is_marked(2, 2));
    }

    #[test]
    fn test_from_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let card = Card::from_range(3, 3, 10, 20, &mut rng).unwrap();
        let values: HashSet<Number> = card.numbers().iter().flatten().copied().collect();
        assert_eq!(values.len(), 9);
        assert!(values.iter().all(|n| (10..=20).contains(n)));

        let too_small = Card::from_range(3, 3, 1, 8, &mut rng);
        assert_eq!(too_small, Err(BingoError::InvalidRange { min: 1, max: 8 }));
    }

    #[test]
    fn test_deserialize_keeps_card_and_marks() {
        let mut card = Card::from_numbers(&SCENARIO_CARD, 5, 5).unwrap();
        card.mark(20);
        let json = serde_json::to_string(&card).unwrap();
        let restored: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, card);
    }

    #[test]
    fn test_deserialize_rejects_empty_card() {
        let result = serde_json::from_str::<Card>(r#"{"rows":0,"cols":5,"numbers":[],"marked":[]}"#);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("0x5 card"), "{message}");
    }

    #[test]
    fn test_deserialize_rejects_mismatched_grids() {
        let short = r#"{"rows":5,"cols":5,"numbers":[[1]],"marked":[[false]]}"#;
        let message = serde_json::from_str::<Card>(short).unwrap_err().to_string();
        assert!(message.contains("expected 25 numbers for the card, got 1"), "{message}");

        // right count, wrong shape
        let ragged = r#"{"rows":2,"cols":2,"numbers":[[1,2,3],[4]],"marked":[[false,false],[false,false]]}"#;
        let message = serde_json::from_str::<Card>(ragged).unwrap_err().to_string();
        assert!(message.contains("2x2 card"), "{message}");

        let bad_marks = r#"{"rows":1,"cols":2,"numbers":[[1,2]],"marked":[[true]]}"#;
        assert!(serde_json::from_str::<Card>(bad_marks).is_err());
    }

    #[test]
    fn test_deserialized_card_gets_free_cell_marked() {
        let card = Card::from_numbers(&SCENARIO_CARD, 5, 5).unwrap();
        let mut value = serde_json::to_value(&card).unwrap();
        value["marked"][2][2] = serde_json::Value::Bool(false);
        let restored: Card = serde_json::from_value(value).unwrap();
        assert!(restored.is_marked(2, 2));
        assert!(!WinStrategy::LShape.check_win(&restored));
    }

    #[test]
    fn test_card_id_depends_on_content() {
        let card = Card::from_numbers(&SCENARIO_CARD, 5, 5).unwrap();
        let mut marked = card.clone();
        marked.mark(5);
        assert_eq!(card.id(), marked.id());
        assert_eq!(card.id_string().len(), 16);

        let mut other_numbers = SCENARIO_CARD;
        other_numbers.swap(0, 5);
        let other = Card::from_numbers(&other_numbers, 5, 5).unwrap();
        assert_ne!(card.id(), other.id());
    }

    #[test]
    fn test_generator_unique_ids() {
        let mut generator = CardGenerator::seeded(42);
        let cards = generator.generate_cards(20);
        let ids: HashSet<u64> = cards.iter().map(Card::id).collect();
        assert_eq!(ids.len(), 20);
        assert_eq!(generator.issued_count(), 20);
        assert!(cards.iter().all(Card::is_standard));
    }

    #[test]
    fn test_generator_seeded_is_reproducible() {
        let a = CardGenerator::seeded(9).generate_cards(3);
        let b = CardGenerator::seeded(9).generate_cards(3);
        assert_eq!(a, b);
    }
}
