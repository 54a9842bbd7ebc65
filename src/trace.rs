//! # Run Diagnostics
//!
//! Observers see the board once, every completed round, and the final report.
//! They are for humans only: output goes to stderr or a trace file, never to
//! the contestant's pipes, and nothing here feeds back into scoring.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use itertools::Itertools;
use serde_json::Value as JsonValue;

use crate::board::{Board, GOAL_MARGIN};
use crate::judge::RoundEvent;
use crate::score::Report;
use crate::GOAL;

/// Cells per row in table dumps, and cells shown ahead of the walker.
const ROW: usize = 20;

pub trait Observer {
    fn on_start(&mut self, _board: &Board) {}
    fn on_round(&mut self, _event: &RoundEvent) {}
    fn on_finish(&mut self, _report: &Report) {}
}

/// Observes nothing.
pub struct NoTrace;

impl Observer for NoTrace {}

impl Observer for Vec<Box<dyn Observer>> {
    fn on_start(&mut self, board: &Board) {
        for o in self.iter_mut() {
            o.on_start(board);
        }
    }
    fn on_round(&mut self, event: &RoundEvent) {
        for o in self.iter_mut() {
            o.on_round(event);
        }
    }
    fn on_finish(&mut self, report: &Report) {
        for o in self.iter_mut() {
            o.on_finish(report);
        }
    }
}

/// Formats `values` as rows of 20, each prefixed with its first index.
pub fn render_table(values: &[u64]) -> String {
    values
        .chunks(ROW)
        .enumerate()
        .map(|(i, row)| {
            format!(
                "{:3}: {}",
                i * ROW,
                row.iter().map(|v| format!("{:3}", v)).join(" ")
            )
        })
        .join("\n")
}

/// Human-readable trace: board and visit-count tables with `info`, one line
/// per round plus the window ahead of the walker with `debug`.
pub struct TextTrace<W: Write> {
    out: W,
    info: bool,
    debug: bool,
    dump_every: Option<usize>,
    board: Vec<u64>,
    seen: Vec<bool>,
    visits: Vec<u64>,
    score: u64,
    goals: u64,
}

impl TextTrace<io::Stderr> {
    pub fn stderr(info: bool, debug: bool, dump_every: Option<usize>) -> Self {
        Self::new(io::stderr(), info, debug, dump_every)
    }
}

impl<W: Write> TextTrace<W> {
    pub fn new(out: W, info: bool, debug: bool, dump_every: Option<usize>) -> Self {
        Self {
            out,
            info,
            debug,
            dump_every: dump_every.filter(|&k| k > 0),
            board: vec![],
            seen: vec![],
            visits: vec![0; GOAL + 1],
            score: 0,
            goals: 0,
        }
    }

    pub fn visits(&self) -> &[u64] {
        &self.visits
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text);
    }

    fn dump_visits(&mut self, title: &str) {
        let table = render_table(&self.visits);
        self.emit(title);
        self.emit(&table);
    }

    fn round_line(&self, event: &RoundEvent) -> String {
        let dice = event
            .dice
            .faces()
            .iter()
            .enumerate()
            .map(|(j, f)| {
                if j == event.index {
                    format!("[{}]", f)
                } else {
                    format!(" {} ", f)
                }
            })
            .join("");
        format!(
            "{:4}, pos: {:3} => {:3}, dice: {} score: {} goal: {}",
            event.round, event.from, event.feedback.position, dice, self.score, self.goals
        )
    }

    /// The 20 cells from `start`, wrapping past the last non-goal cell to 0.
    fn window(&self, start: usize) -> (String, String) {
        let cells = (start..start + ROW).map(|j| j % GOAL);
        let values = cells
            .clone()
            .map(|i| {
                if self.seen.get(i).copied().unwrap_or(false) {
                    format!("{:3}", self.board[i])
                } else {
                    "  ?".to_string()
                }
            })
            .join(" ");
        let indexes = cells.map(|i| format!("{:3}", i)).join(" ");
        (values, indexes)
    }
}

impl<W: Write> Observer for TextTrace<W> {
    fn on_start(&mut self, board: &Board) {
        self.board = board.cells().to_vec();
        self.seen = vec![false; GOAL + 1];
        self.seen[0] = true;
        for seen in &mut self.seen[GOAL - GOAL_MARGIN..] {
            *seen = true;
        }
        if self.info {
            let table = render_table(board.cells());
            self.emit("cell values");
            self.emit(&table);
        }
    }

    fn on_round(&mut self, event: &RoundEvent) {
        let landed = event.feedback.position;
        self.visits[landed] += 1;
        self.score = event.report.score;
        self.goals = event.report.goal;
        if landed < self.seen.len() {
            self.seen[landed] = true;
        }
        if self.debug {
            let line = self.round_line(event);
            let (values, indexes) = self.window(if event.goal { 0 } else { landed });
            self.emit(&line);
            self.emit(&format!("value: {}\nindex: {}\n", values, indexes));
        }
        if let Some(k) = self.dump_every
            && (event.round + 1) % k == 0
        {
            self.dump_visits(&format!("visit counts after round {}", event.round));
        }
    }

    fn on_finish(&mut self, _report: &Report) {
        if self.info {
            self.dump_visits("visit counts");
        }
        let _ = self.out.flush();
    }
}

/// Writes one timestamped JSON object per round, and one for the final report.
pub struct JsonlTrace<W: Write> {
    out: W,
    failed: bool,
}

impl JsonlTrace<BufWriter<File>> {
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Cannot create trace file {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonlTrace<W> {
    pub fn new(out: W) -> Self {
        Self { out, failed: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_record(&mut self, record: &impl serde::Serialize) {
        if self.failed {
            return;
        }
        if let Err(e) = write_jsonl(&mut self.out, record) {
            eprintln!("[judge] trace disabled after write failure: {:#}", e);
            self.failed = true;
        }
    }
}

impl<W: Write> Observer for JsonlTrace<W> {
    fn on_round(&mut self, event: &RoundEvent) {
        self.write_record(event);
    }

    fn on_finish(&mut self, report: &Report) {
        self.write_record(report);
        let _ = self.out.flush();
    }
}

fn write_jsonl(out: &mut dyn Write, record: &impl serde::Serialize) -> anyhow::Result<()> {
    let mut obj = serde_json::Map::new();
    obj.insert(
        "timestamp".to_string(),
        JsonValue::String(chrono::Utc::now().to_rfc3339()),
    );
    if let JsonValue::Object(fields) = serde_json::to_value(record)? {
        obj.extend(fields);
    }
    let line = serde_json::to_string(&obj)?;
    out.write_all(line.as_bytes())?;
    out.write_all(b"\n")?;
    Ok(())
}
