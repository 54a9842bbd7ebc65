use std::collections::VecDeque;
use std::io::BufRead;

use super::Contestant;
use crate::error::JudgeError;

/// Replays pre-recorded contestant lines and records what the judge sends.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    answers: VecDeque<String>,
    sent: Vec<String>,
}

impl Transcript {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            sent: vec![],
        }
    }

    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let answers = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
        Ok(Self::new(answers))
    }

    /// Every line the judge has sent so far, launch line first.
    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Contestant for Transcript {
    fn send(&mut self, line: &str) -> Result<(), JudgeError> {
        self.sent.push(line.to_string());
        Ok(())
    }

    fn recv(&mut self, round: usize) -> Result<String, JudgeError> {
        self.answers
            .pop_front()
            .ok_or_else(|| JudgeError::process(format!("round {}: transcript ended", round)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_in_order_and_records_sent() {
        let mut t = Transcript::from_reader("1 2 3 4 5 6\n6 2 3 4 5 6\n".as_bytes()).unwrap();
        assert_eq!(t.remaining(), 2);
        t.send("500 5000").unwrap();
        assert_eq!(t.recv(0).unwrap(), "1 2 3 4 5 6");
        assert_eq!(t.recv(1).unwrap(), "6 2 3 4 5 6");
        assert!(matches!(t.recv(2), Err(JudgeError::Process { .. })));
        assert_eq!(t.sent(), &["500 5000".to_string()]);
    }
}
