use std::time::Duration;

use thiserror::Error;

use crate::dice::{Dice, DiceError};

/// Fatal failures of a judge run. None of them is retried: the contestant
/// is terminated and the run reports no score.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("round {round}: output is not six integers: {line:?}")]
    Format { round: usize, line: String },

    #[error("round {round}: value out of range [1, 6]: {value} (line {line:?})")]
    Range {
        round: usize,
        value: i64,
        line: String,
    },

    #[error("round {round}: changed {count} faces at once: {prev} => {next}")]
    TooManyChanges {
        round: usize,
        count: usize,
        prev: Dice,
        next: Dice,
    },

    #[error("round {round}: no output within {}ms", .limit.as_millis())]
    Timeout { round: usize, limit: Duration },

    #[error("contestant process error: {message}")]
    Process { message: String },
}

impl JudgeError {
    pub fn process(message: impl Into<String>) -> Self {
        Self::Process {
            message: message.into(),
        }
    }

    pub(crate) fn from_dice(err: DiceError, round: usize, line: &str) -> Self {
        let line = line.to_string();
        match err {
            DiceError::NotSixIntegers => Self::Format { round, line },
            DiceError::OutOfRange(value) => Self::Range { round, value, line },
        }
    }

    /// `!log status` tag for this failure.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "TLE",
            Self::Process { .. } => "RE",
            _ => "WA",
        }
    }
}
