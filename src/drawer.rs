// src/drawer.rs
// The ball drawer: a shuffled pouch of numbers that are called one at a time
// without repetition.

use crate::defs::{Number, FIRSTNUMBER, LASTNUMBER};
use crate::error::{BingoError, Result};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Draws every number of `min..=max` exactly once, in an order shuffled at
/// reset time.
///
/// The undrawn pool and the drawn history are always disjoint and together
/// cover the whole range.
#[derive(Debug, Clone)]
pub struct BallDrawer {
    min: Number,
    max: Number,
    // Undrawn balls; the next ball is at the end.
    pool: Vec<Number>,
    drawn: Vec<Number>,
    rng: StdRng,
}

impl BallDrawer {
    /// Drawer over `min..=max`, already shuffled and ready to draw.
    pub fn new(min: Number, max: Number) -> Result<Self> {
        Self::with_rng(min, max, StdRng::from_os_rng())
    }

    /// Drawer whose shuffles are reproducible.
    pub fn seeded(min: Number, max: Number, seed: u64) -> Result<Self> {
        Self::with_rng(min, max, StdRng::seed_from_u64(seed))
    }

    /// Drawer that calls the balls in exactly the given order.
    ///
    /// `order` must be a permutation of `min..=max`. A later [`reset`](Self::reset)
    /// reshuffles randomly.
    pub fn with_order(min: Number, max: Number, order: Vec<Number>) -> Result<Self> {
        Self::ordered(min, max, order, StdRng::from_os_rng())
    }

    /// Same as [`with_order`](Self::with_order), with later resets
    /// reproducible from `seed`.
    pub fn seeded_with_order(min: Number, max: Number, order: Vec<Number>, seed: u64) -> Result<Self> {
        Self::ordered(min, max, order, StdRng::seed_from_u64(seed))
    }

    fn ordered(min: Number, max: Number, order: Vec<Number>, rng: StdRng) -> Result<Self> {
        let mut drawer = Self::with_rng(min, max, rng)?;

        let mut sorted = order.clone();
        sorted.sort_unstable();
        if !sorted.iter().copied().eq(min..=max) {
            return Err(BingoError::InvalidDrawOrder { min, max });
        }

        drawer.pool = order.into_iter().rev().collect();
        Ok(drawer)
    }

    fn with_rng(min: Number, max: Number, rng: StdRng) -> Result<Self> {
        if min > max {
            return Err(BingoError::InvalidRange { min, max });
        }

        let mut drawer = BallDrawer {
            min,
            max,
            pool: Vec::new(),
            drawn: Vec::new(),
            rng,
        };
        drawer.reset();
        Ok(drawer)
    }

    /// Refill the pool with the whole range in a fresh random order and forget
    /// every drawn ball.
    pub fn reset(&mut self) {
        self.pool = (self.min..=self.max).collect();
        self.pool.shuffle(&mut self.rng);
        self.drawn.clear();
    }

    /// Next ball, or `None` once the pool is empty.
    pub fn draw(&mut self) -> Option<Number> {
        let ball = self.pool.pop()?;
        self.drawn.push(ball);
        Some(ball)
    }

    pub fn remaining_count(&self) -> usize {
        self.pool.len()
    }

    pub fn has_more(&self) -> bool {
        !self.pool.is_empty()
    }

    /// Balls drawn so far, in draw order.
    pub fn drawn_history(&self) -> &[Number] {
        &self.drawn
    }

    pub fn last_drawn(&self) -> Option<Number> {
        self.drawn.last().copied()
    }

    pub fn range(&self) -> (Number, Number) {
        (self.min, self.max)
    }

    /// Size of the whole range.
    pub fn total(&self) -> usize {
        (self.max - self.min) as usize + 1
    }
}

impl Default for BallDrawer {
    fn default() -> Self {
        let mut drawer = BallDrawer {
            min: FIRSTNUMBER,
            max: LASTNUMBER,
            pool: Vec::new(),
            drawn: Vec::new(),
            rng: StdRng::from_os_rng(),
        };
        drawer.reset();
        drawer
    }
}
