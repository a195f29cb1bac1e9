// src/defs.rs
// Shared constants and the basic number type for the Bingo engine.

pub type Number = u8;

pub struct CardStruct {
    pub rows: usize,
    pub cols: usize,
    pub free_row: usize,
    pub free_col: usize,
}

pub const CARDCONFIG: CardStruct = CardStruct {
    rows: 5, // rows in a standard card
    cols: 5, // columns in a standard card, one per B-I-N-G-O letter
    free_row: 2, // row of the free cell
    free_col: 2, // column of the free cell
};

pub const FIRSTNUMBER: Number = 1;
pub const LASTNUMBER: Number = 75;
pub const NUMBERSPERCOLUMN: Number = (LASTNUMBER - FIRSTNUMBER + 1) / CARDCONFIG.cols as Number;

// Value stored in the free cell. Never equal to a drawn ball.
pub const FREE: Number = 0;

pub const COLUMN_RANGES: [(Number, Number); 5] = [
    (1, 15),  // B
    (16, 30), // I
    (31, 45), // N
    (46, 60), // G
    (61, 75), // O
];

pub const COLUMN_HEADERS: [&str; 5] = ["B", "I", "N", "G", "O"];

/// Letter of the column a ball belongs to on a standard card, if any.
pub fn column_letter(ball: Number) -> Option<&'static str> {
    COLUMN_RANGES
        .iter()
        .position(|&(min, max)| (min..=max).contains(&ball))
        .map(|col| COLUMN_HEADERS[col])
}

/// Ball as it is announced, e.g. "N-34". Balls outside 1..=75 are announced bare.
pub fn announce(ball: Number) -> String {
    match column_letter(ball) {
        Some(letter) => format!("{letter}-{ball}"),
        None => ball.to_string(),
    }
}
