// src/strategy.rs
// Win strategies: pure checks over a card's marked grid, one per winning shape.

use crate::card::Card;
use crate::error::BingoError;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Set of `(row, col)` cells, ordered row-major.
pub type CellSet = BTreeSet<(usize, usize)>;

/// The winning shape for a session. Every variant is stateless and can be
/// checked against any number of cards.
///
/// `Diagonal` and `XShape` only make sense on square cards and never report a
/// win on a rectangular one. `LShape` works on any shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WinStrategy {
    Horizontal,
    Vertical,
    Diagonal,
    LShape,
    XShape,
}

impl WinStrategy {
    pub const ALL: [WinStrategy; 5] = [
        WinStrategy::Horizontal,
        WinStrategy::Vertical,
        WinStrategy::Diagonal,
        WinStrategy::LShape,
        WinStrategy::XShape,
    ];

    /// Display name of the pattern.
    pub fn name(&self) -> &'static str {
        match self {
            WinStrategy::Horizontal => "Horizontal line",
            WinStrategy::Vertical => "Vertical line",
            WinStrategy::Diagonal => "Diagonal",
            WinStrategy::LShape => "L shape",
            WinStrategy::XShape => "X shape",
        }
    }

    /// Pick one of the five patterns uniformly at random.
    pub fn choose<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn check_win(&self, card: &Card) -> bool {
        match self {
            WinStrategy::Horizontal => (0..card.rows()).any(|row| row_complete(card, row)),
            WinStrategy::Vertical => (0..card.cols()).any(|col| col_complete(card, col)),
            WinStrategy::Diagonal => main_diagonal_complete(card) || anti_diagonal_complete(card),
            WinStrategy::LShape => left_l_complete(card) || right_l_complete(card),
            WinStrategy::XShape => main_diagonal_complete(card) && anti_diagonal_complete(card),
        }
    }

    /// Cells forming the completed pattern(s) on `card`; empty when the card
    /// does not win. When several lines qualify (two full rows, both
    /// diagonals) all of them are included.
    pub fn winning_cells(&self, card: &Card) -> CellSet {
        let rows = card.rows();
        let cols = card.cols();
        let mut cells = CellSet::new();

        match self {
            WinStrategy::Horizontal => {
                for row in (0..rows).filter(|&row| row_complete(card, row)) {
                    cells.extend((0..cols).map(|col| (row, col)));
                }
            }
            WinStrategy::Vertical => {
                for col in (0..cols).filter(|&col| col_complete(card, col)) {
                    cells.extend((0..rows).map(|row| (row, col)));
                }
            }
            WinStrategy::Diagonal => {
                if main_diagonal_complete(card) {
                    cells.extend(main_diagonal(rows));
                }
                if anti_diagonal_complete(card) {
                    cells.extend(anti_diagonal(rows));
                }
            }
            WinStrategy::LShape => {
                if left_l_complete(card) {
                    cells.extend((0..rows).map(|row| (row, 0)));
                    cells.extend((0..cols).map(|col| (rows - 1, col)));
                }
                if right_l_complete(card) {
                    cells.extend((0..rows).map(|row| (row, cols - 1)));
                    cells.extend((0..cols).map(|col| (0, col)));
                }
            }
            WinStrategy::XShape => {
                if main_diagonal_complete(card) && anti_diagonal_complete(card) {
                    cells.extend(main_diagonal(rows));
                    cells.extend(anti_diagonal(rows));
                }
            }
        }

        cells
    }
}

impl fmt::Display for WinStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WinStrategy {
    type Err = BingoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "horizontal" | "row" => Ok(WinStrategy::Horizontal),
            "vertical" | "column" => Ok(WinStrategy::Vertical),
            "diagonal" => Ok(WinStrategy::Diagonal),
            "l" | "lshape" => Ok(WinStrategy::LShape),
            "x" | "xshape" => Ok(WinStrategy::XShape),
            _ => Err(BingoError::UnknownStrategy(s.to_string())),
        }
    }
}

fn row_complete(card: &Card, row: usize) -> bool {
    (0..card.cols()).all(|col| card.is_marked(row, col))
}

fn col_complete(card: &Card, col: usize) -> bool {
    (0..card.rows()).all(|row| card.is_marked(row, col))
}

fn main_diagonal(size: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..size).map(|i| (i, i))
}

fn anti_diagonal(size: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..size).map(move |i| (i, size - 1 - i))
}

fn main_diagonal_complete(card: &Card) -> bool {
    card.rows() == card.cols() && main_diagonal(card.rows()).all(|(row, col)| card.is_marked(row, col))
}

fn anti_diagonal_complete(card: &Card) -> bool {
    card.rows() == card.cols() && anti_diagonal(card.rows()).all(|(row, col)| card.is_marked(row, col))
}

// Left column plus bottom row.
fn left_l_complete(card: &Card) -> bool {
    col_complete(card, 0) && row_complete(card, card.rows() - 1)
}

// Right column plus top row.
fn right_l_complete(card: &Card) -> bool {
    col_complete(card, card.cols() - 1) && row_complete(card, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::Number;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // Numbers 1..=25 row-major, center replaced by the free sentinel.
    fn numbered_card() -> Card {
        let mut numbers: Vec<Number> = (1..=25).collect();
        numbers[12] = 0;
        Card::from_numbers(&numbers, 5, 5).unwrap()
    }

    fn card_with_marks(cells: &[(usize, usize)]) -> Card {
        let mut card = numbered_card();
        for &(row, col) in cells {
            let number = card.number(row, col);
            card.mark(number);
        }
        card
    }

    fn row(r: usize) -> Vec<(usize, usize)> {
        (0..5).map(|c| (r, c)).collect()
    }

    fn col(c: usize) -> Vec<(usize, usize)> {
        (0..5).map(|r| (r, c)).collect()
    }

    fn diagonal() -> Vec<(usize, usize)> {
        (0..5).map(|i| (i, i)).collect()
    }

    fn anti() -> Vec<(usize, usize)> {
        (0..5).map(|i| (i, 4 - i)).collect()
    }

    #[test]
    fn test_fresh_card_wins_nothing() {
        let card = numbered_card();
        for strategy in WinStrategy::ALL {
            assert!(!strategy.check_win(&card), "{strategy} on fresh card");
            assert!(strategy.winning_cells(&card).is_empty());
        }
    }

    #[test]
    fn test_top_row_only() {
        let card = card_with_marks(&row(0));
        assert!(WinStrategy::Horizontal.check_win(&card));
        assert!(!WinStrategy::Vertical.check_win(&card));
        assert!(!WinStrategy::Diagonal.check_win(&card));
        assert!(!WinStrategy::XShape.check_win(&card));
        assert!(!WinStrategy::LShape.check_win(&card));
    }

    #[test]
    fn test_middle_row_uses_free_cell() {
        let cells: Vec<_> = row(2).into_iter().filter(|&cell| cell != (2, 2)).collect();
        let card = card_with_marks(&cells);
        assert!(WinStrategy::Horizontal.check_win(&card));
        assert_eq!(WinStrategy::Horizontal.winning_cells(&card), row(2).into_iter().collect());
    }

    #[test]
    fn test_vertical() {
        let card = card_with_marks(&col(3));
        assert!(WinStrategy::Vertical.check_win(&card));
        assert!(!WinStrategy::Horizontal.check_win(&card));
        assert_eq!(WinStrategy::Vertical.winning_cells(&card), col(3).into_iter().collect());
    }

    #[test]
    fn test_four_of_five_is_not_a_line() {
        let card = card_with_marks(&row(0)[..4]);
        assert!(!WinStrategy::Horizontal.check_win(&card));
        let card = card_with_marks(&col(0)[1..]);
        assert!(!WinStrategy::Vertical.check_win(&card));
    }

    #[test]
    fn test_diagonal_main_and_anti() {
        let card = card_with_marks(&diagonal());
        assert!(WinStrategy::Diagonal.check_win(&card));
        assert!(!WinStrategy::XShape.check_win(&card));
        assert_eq!(WinStrategy::Diagonal.winning_cells(&card), diagonal().into_iter().collect());

        let card = card_with_marks(&anti());
        assert!(WinStrategy::Diagonal.check_win(&card));
        assert!(!WinStrategy::XShape.check_win(&card));
    }

    #[test]
    fn test_x_shape_needs_both_diagonals() {
        let mut cells = diagonal();
        cells.extend(anti());
        let card = card_with_marks(&cells);
        assert!(WinStrategy::XShape.check_win(&card));
        assert!(WinStrategy::Diagonal.check_win(&card));
        assert_eq!(WinStrategy::XShape.winning_cells(&card).len(), 9);

        let mut partial = diagonal();
        partial.extend(anti().into_iter().filter(|&cell| cell != (0, 4)));
        let card = card_with_marks(&partial);
        assert!(!WinStrategy::XShape.check_win(&card));
    }

    #[test]
    fn test_l_shape_left_column_bottom_row() {
        let mut cells = col(0);
        cells.extend(row(4));
        let card = card_with_marks(&cells);
        assert!(WinStrategy::LShape.check_win(&card));
        assert_eq!(WinStrategy::LShape.winning_cells(&card).len(), 9);
    }

    #[test]
    fn test_l_shape_right_column_top_row() {
        let mut cells = col(4);
        cells.extend(row(0));
        let card = card_with_marks(&cells);
        assert!(WinStrategy::LShape.check_win(&card));
    }

    #[test]
    fn test_partial_l_is_not_a_win() {
        let mut cells = col(0);
        cells.extend(row(0));
        let card = card_with_marks(&cells);
        assert!(!WinStrategy::LShape.check_win(&card));

        let mut cells = col(0);
        cells.extend(row(4)[1..4].iter().copied());
        let card = card_with_marks(&cells);
        assert!(!WinStrategy::LShape.check_win(&card));
    }

    #[test]
    fn test_rectangular_card_diagonals_never_win() {
        let numbers: Vec<Number> = (1..=12).collect();
        let mut card = Card::from_numbers(&numbers, 3, 4).unwrap();
        for n in numbers {
            card.mark(n);
        }
        assert!(WinStrategy::Horizontal.check_win(&card));
        assert!(WinStrategy::Vertical.check_win(&card));
        assert!(WinStrategy::LShape.check_win(&card));
        assert!(!WinStrategy::Diagonal.check_win(&card));
        assert!(!WinStrategy::XShape.check_win(&card));
    }

    #[test]
    fn test_check_win_agrees_with_winning_cells() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let mut card = numbered_card();
            for number in 1..=25 {
                if rng.random_bool(0.6) {
                    card.mark(number);
                }
            }
            for strategy in WinStrategy::ALL {
                let cells = strategy.winning_cells(&card);
                assert_eq!(strategy.check_win(&card), !cells.is_empty(), "{strategy}");
                assert!(cells.iter().all(|&(r, c)| card.is_marked(r, c)));
            }
        }
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!("horizontal".parse::<WinStrategy>(), Ok(WinStrategy::Horizontal));
        assert_eq!("Vertical".parse::<WinStrategy>(), Ok(WinStrategy::Vertical));
        assert_eq!("l-shape".parse::<WinStrategy>(), Ok(WinStrategy::LShape));
        assert_eq!("X".parse::<WinStrategy>(), Ok(WinStrategy::XShape));
        assert_eq!(
            "zigzag".parse::<WinStrategy>(),
            Err(BingoError::UnknownStrategy("zigzag".to_string()))
        );
    }

    #[test]
    fn test_choose_covers_every_strategy() {
        let mut rng = StdRng::seed_from_u64(5);
        let chosen: std::collections::HashSet<WinStrategy> =
            (0..500).map(|_| WinStrategy::choose(&mut rng)).collect();
        assert_eq!(chosen.len(), 5);
    }

    #[test]
    fn test_names_are_distinct() {
        let names: std::collections::HashSet<&str> = WinStrategy::ALL.iter().map(WinStrategy::name).collect();
        assert_eq!(names.len(), 5);
    }
}
