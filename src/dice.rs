use std::fmt;
use std::num::IntErrorKind;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of faces a contestant declares each round.
pub const FACES: usize = 6;
/// Faces may change by at most this many positions between rounds.
pub const MAX_CHANGES: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("expected six integers")]
    NotSixIntegers,
    #[error("value out of range: {0}")]
    OutOfRange(i64),
}

/// The six face values a contestant declares, each in `[1, 6]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dice([u8; FACES]);

impl Dice {
    pub const INITIAL: Dice = Dice([1, 2, 3, 4, 5, 6]);

    pub fn new(faces: [u8; FACES]) -> Result<Self, DiceError> {
        match faces.iter().find(|&&f| !(1..=6).contains(&f)) {
            Some(&f) => Err(DiceError::OutOfRange(f as i64)),
            None => Ok(Self(faces)),
        }
    }

    /// Parses one contestant line: six whitespace-separated integers.
    ///
    /// Every value is range-checked, so a line that is both out of range and
    /// changes several faces is reported as out of range.
    pub fn parse(line: &str) -> Result<Self, DiceError> {
        let values: Vec<i64> = line
            .split_whitespace()
            .map(parse_value)
            .collect::<Result<_, _>>()?;
        if values.len() != FACES {
            return Err(DiceError::NotSixIntegers);
        }
        let mut faces = [0u8; FACES];
        for (face, &v) in faces.iter_mut().zip(&values) {
            if !(1..=6).contains(&v) {
                return Err(DiceError::OutOfRange(v));
            }
            *face = v as u8;
        }
        Ok(Self(faces))
    }

    pub fn face(&self, index: usize) -> u8 {
        self.0[index]
    }

    pub fn faces(&self) -> &[u8; FACES] {
        &self.0
    }

    /// Number of positions where `self` differs from `prev`.
    pub fn changes_from(&self, prev: &Dice) -> usize {
        self.0.iter().zip(&prev.0).filter(|(a, b)| a != b).count()
    }
}

/// Integers too large for `i64` saturate, so they still fail the range check.
fn parse_value(token: &str) -> Result<i64, DiceError> {
    token.parse::<i64>().or_else(|e| match e.kind() {
        IntErrorKind::PosOverflow => Ok(i64::MAX),
        IntErrorKind::NegOverflow => Ok(i64::MIN),
        _ => Err(DiceError::NotSixIntegers),
    })
}

impl Default for Dice {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}
