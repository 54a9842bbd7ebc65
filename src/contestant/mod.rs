//! # Contestant Transport
//!
//! The judge talks to a contestant through two ordered, newline-framed
//! channels: lines the judge sends and lines the contestant answers with.
//! [`ProcessContestant`] drives a real child process over pipes;
//! [`Transcript`] replays recorded answers in memory.

use crate::error::JudgeError;

mod guard;
pub mod process;
pub mod transcript;

pub use guard::install_ctrlc_handler;
pub use process::ProcessContestant;
pub use transcript::Transcript;

pub trait Contestant {
    /// Delivers one line (without the trailing newline) and flushes it.
    fn send(&mut self, line: &str) -> Result<(), JudgeError>;
    /// Waits for the contestant's next line for `round`.
    fn recv(&mut self, round: usize) -> Result<String, JudgeError>;
    /// Called once after the last round completed normally.
    fn finish(&mut self) {}
    /// Called once when the run fails; must stop the contestant.
    fn abort(&mut self) {}
}
