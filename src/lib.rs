// # Dicejudge: Interactive Dice-Board Judge
//
// This crate scores a contestant program that plays the dice-board game over
// pipes. The contestant declares six dice faces each round, the judge rolls
// one of them with a seeded generator and walks a hidden board, and the score
// is the sum of the cells the walker lands on.
//
// A single seed fixes both the board and every judge-side roll, so runs are
// reproducible and independent runs share no state.

/// Index of the goal cell; the board has `GOAL + 1` cells.
pub const GOAL: usize = 500;
/// Number of rounds in a game.
pub const ROUNDS: usize = 5000;
/// Value of the goal cell.
pub const GOAL_BONUS: u64 = 5000;

/// Seeded xorshift generator shared by board synthesis and play.
pub mod rng;

/// Hidden board generation.
pub mod board;

/// Declared dice faces and contestant line parsing.
pub mod dice;

/// Walker movement with reflection at the goal.
pub mod walk;

/// Score accumulation and the final report.
pub mod score;

/// Fatal run errors.
pub mod error;

/// Transports to the contestant: child processes and recorded transcripts.
pub mod contestant;

/// The turn loop.
pub mod judge;

/// Human-facing diagnostics kept apart from the protocol streams.
pub mod trace;

/// Run settings and environment overrides.
pub mod config;

pub use config::JudgeConfig;
pub use error::JudgeError;
pub use judge::DiceJudge;
pub use score::Report;
