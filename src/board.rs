//! # Board Synthesis
//!
//! The hidden board is a row of `GOAL + 1` cells. The goal cell carries a
//! fixed bonus and every other cell starts at zero and collects additive
//! bumps from random contiguous segments.

use anyhow::ensure;

use crate::rng::XorShift;
use crate::{GOAL, GOAL_BONUS};

/// Number of random segments added to the board.
pub const NUM_BUMPS: usize = 100;
/// Segment lengths are drawn from `[1, MAX_BUMP_LEN]`.
pub const MAX_BUMP_LEN: u64 = 10;
/// Segment magnitudes are drawn from `[1, MAX_BUMP]`.
pub const MAX_BUMP: u64 = 200;
/// Cells this close to the goal never receive a bump.
pub const GOAL_MARGIN: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: Vec<u64>,
}

impl Board {
    /// Builds a board from the generator's current state.
    ///
    /// Each bump draws its length, then its magnitude, then its start cell.
    /// That order is part of the reproducibility contract.
    pub fn build(rng: &mut XorShift) -> Self {
        let mut cells = vec![0; GOAL + 1];
        cells[GOAL] = GOAL_BONUS;
        for _ in 0..NUM_BUMPS {
            let len = rng.next_int(MAX_BUMP_LEN) as usize + 1;
            let add = rng.next_int(MAX_BUMP) + 1;
            let start = rng.next_int((GOAL - GOAL_MARGIN - len) as u64) as usize + 1;
            for cell in &mut cells[start..start + len] {
                *cell += add;
            }
        }
        Self { cells }
    }

    /// Wraps explicit cell values, e.g. a hand-made board for tests.
    pub fn from_cells(cells: Vec<u64>) -> anyhow::Result<Self> {
        ensure!(
            cells.len() == GOAL + 1,
            "board must have {} cells, got {}",
            GOAL + 1,
            cells.len()
        );
        Ok(Self { cells })
    }

    pub fn value(&self, position: usize) -> u64 {
        self.cells[position]
    }

    pub fn cells(&self) -> &[u64] {
        &self.cells
    }
}
