use std::fmt;

use serde::{Deserialize, Serialize};

/// Final result of a run, printed as `score: <int> goal: <int>`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub score: u64,
    pub goal: u64,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "score: {} goal: {}", self.score, self.goal)
    }
}

/// Running totals; only ever grows.
#[derive(Clone, Debug, Default)]
pub struct Scorer {
    score: u64,
    goals: u64,
}

impl Scorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits the value of the landed cell, and a goal if one was reached.
    pub fn record(&mut self, value: u64, goal: bool) {
        self.score += value;
        if goal {
            self.goals += 1;
        }
    }

    pub fn report(&self) -> Report {
        Report {
            score: self.score,
            goal: self.goals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_without_capping() {
        let mut s = Scorer::new();
        s.record(0, false);
        s.record(329, false);
        s.record(5000, true);
        s.record(5000, true);
        assert_eq!(
            s.report(),
            Report {
                score: 10329,
                goal: 2
            }
        );
        assert_eq!(s.report().to_string(), "score: 10329 goal: 2");
    }

    #[test]
    fn report_serializes_as_json() {
        let json = serde_json::to_string(&Report { score: 7, goal: 1 }).unwrap();
        assert_eq!(json, r#"{"score":7,"goal":1}"#);
    }
}
