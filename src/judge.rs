//! # Dice-Board Judge
//!
//! The turn loop of the interactive judge. Each round the contestant declares
//! six face values (changing at most one of them), the judge rolls one of the
//! declared faces with its own generator, walks the hidden board and answers
//! with the move, the value of the landed cell and the landed position.

use std::fmt;

use serde::Serialize;

use crate::board::Board;
use crate::contestant::Contestant;
use crate::dice::{Dice, FACES, MAX_CHANGES};
use crate::error::JudgeError;
use crate::rng::XorShift;
use crate::score::{Report, Scorer};
use crate::trace::Observer;
use crate::walk::Walker;
use crate::{GOAL, ROUNDS};

/// The judge's answer for one round: `<move> <value> <position>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub step: u8,
    pub value: u64,
    pub position: usize,
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.step, self.value, self.position)
    }
}

/// Everything that happened in one accepted round.
#[derive(Clone, Debug, Serialize)]
pub struct RoundEvent {
    pub round: usize,
    pub dice: Dice,
    /// Face chosen by the judge's generator.
    pub index: usize,
    /// Walker position before the move.
    pub from: usize,
    pub feedback: Feedback,
    pub goal: bool,
    /// Totals after this round.
    pub report: Report,
}

pub struct DiceJudge {
    board: Board,
    rng: XorShift,
    dice: Dice,
    walker: Walker,
    scorer: Scorer,
    round: usize,
}

impl DiceJudge {
    /// Builds the board from `seed` and keeps drawing from the same stream
    /// during play.
    pub fn new(seed: u64) -> Self {
        let mut rng = XorShift::new(seed);
        let board = Board::build(&mut rng);
        Self::with_board(board, rng)
    }

    pub fn with_board(board: Board, rng: XorShift) -> Self {
        Self {
            board,
            rng,
            dice: Dice::INITIAL,
            walker: Walker::new(),
            scorer: Scorer::new(),
            round: 0,
        }
    }

    pub fn launch_line() -> String {
        format!("{} {}", GOAL, ROUNDS)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn dice(&self) -> Dice {
        self.dice
    }

    pub fn position(&self) -> usize {
        self.walker.position()
    }

    /// Number of rounds accepted so far.
    pub fn round(&self) -> usize {
        self.round
    }

    pub fn is_finished(&self) -> bool {
        self.round >= ROUNDS
    }

    pub fn report(&self) -> Report {
        self.scorer.report()
    }

    /// Validates one contestant line and plays the round.
    ///
    /// A rejected line leaves the state untouched; in particular no random
    /// number is drawn for it.
    pub fn step(&mut self, line: &str) -> Result<RoundEvent, JudgeError> {
        let round = self.round;
        let dice = Dice::parse(line).map_err(|e| JudgeError::from_dice(e, round, line))?;
        let count = dice.changes_from(&self.dice);
        if count > MAX_CHANGES {
            return Err(JudgeError::TooManyChanges {
                round,
                count,
                prev: self.dice,
                next: dice,
            });
        }

        let index = self.rng.next_int(FACES as u64) as usize;
        let step = dice.face(index);
        let from = self.walker.position();
        let landing = self.walker.advance(step);
        let value = self.board.value(landing.position);
        self.scorer.record(value, landing.goal);
        self.dice = dice;
        self.round += 1;

        Ok(RoundEvent {
            round,
            dice,
            index,
            from,
            feedback: Feedback {
                step,
                value,
                position: landing.position,
            },
            goal: landing.goal,
            report: self.scorer.report(),
        })
    }

    /// Plays all remaining rounds against `contestant`.
    ///
    /// On success the contestant is given a chance to exit on its own; on any
    /// failure it is stopped immediately and no report is produced.
    pub fn run(
        &mut self,
        contestant: &mut dyn Contestant,
        observer: &mut dyn Observer,
    ) -> Result<Report, JudgeError> {
        observer.on_start(&self.board);
        match self.play(contestant, observer) {
            Ok(report) => {
                contestant.finish();
                observer.on_finish(&report);
                Ok(report)
            }
            Err(e) => {
                contestant.abort();
                Err(e)
            }
        }
    }

    fn play(
        &mut self,
        contestant: &mut dyn Contestant,
        observer: &mut dyn Observer,
    ) -> Result<Report, JudgeError> {
        if self.round == 0 {
            contestant.send(&Self::launch_line())?;
        }
        while !self.is_finished() {
            let line = contestant.recv(self.round)?;
            let event = self.step(&line)?;
            contestant.send(&event.feedback.to_string())?;
            observer.on_round(&event);
        }
        Ok(self.report())
    }
}
