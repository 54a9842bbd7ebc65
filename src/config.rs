use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::trace::{JsonlTrace, NoTrace, Observer, TextTrace};

/// Environment variable overriding the per-round timeout, in milliseconds.
pub const TIMEOUT_ENV: &str = "DICEJUDGE_ROUND_TIMEOUT_MS";
pub const DEFAULT_ROUND_TIMEOUT_MS: u64 = 10_000;

/// Settings for one judge run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    pub seed: u64,
    /// Longest wait for a single contestant line.
    pub round_timeout_ms: u64,
    /// Dump the board at start and visit counts at the end.
    pub info: bool,
    /// Trace every round.
    pub debug: bool,
    /// Also dump visit counts every this many rounds.
    pub dump_every: Option<usize>,
    /// JSONL trace file.
    pub trace: Option<PathBuf>,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            round_timeout_ms: DEFAULT_ROUND_TIMEOUT_MS,
            info: false,
            debug: false,
            dump_every: None,
            trace: None,
        }
    }
}

impl JudgeConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn round_timeout(&self) -> Duration {
        Duration::from_millis(self.round_timeout_ms)
    }

    pub fn with_env_overrides(self) -> anyhow::Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up by variable name.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        if let Some(v) = lookup(TIMEOUT_ENV) {
            self.round_timeout_ms = v
                .trim()
                .parse()
                .with_context(|| format!("{} must be milliseconds, got {:?}", TIMEOUT_ENV, v))?;
        }
        Ok(self)
    }

    /// Builds the diagnostic observers this configuration asks for.
    pub fn observer(&self) -> anyhow::Result<Box<dyn Observer>> {
        let mut observers: Vec<Box<dyn Observer>> = vec![];
        if self.info || self.debug || self.dump_every.is_some() {
            observers.push(Box::new(TextTrace::stderr(
                self.info,
                self.debug,
                self.dump_every,
            )));
        }
        if let Some(path) = &self.trace {
            observers.push(Box::new(JsonlTrace::create(path)?));
        }
        Ok(match observers.len() {
            0 => Box::new(NoTrace),
            _ => Box::new(observers),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = JudgeConfig::new(5);
        assert_eq!(config.seed, 5);
        assert_eq!(config.round_timeout(), Duration::from_secs(10));
        assert!(config.observer().is_ok());
    }

    #[test]
    fn timeout_override() {
        let config = JudgeConfig::new(1)
            .with_overrides(|key| (key == TIMEOUT_ENV).then(|| " 250 ".to_string()))
            .unwrap();
        assert_eq!(config.round_timeout(), Duration::from_millis(250));

        let err = JudgeConfig::new(1)
            .with_overrides(|_| Some("soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(TIMEOUT_ENV));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: JudgeConfig = serde_json::from_str(r#"{"seed": 3, "debug": true}"#).unwrap();
        assert_eq!(config.seed, 3);
        assert!(config.debug);
        assert_eq!(config.round_timeout_ms, DEFAULT_ROUND_TIMEOUT_MS);
    }

    #[test]
    fn trace_file_is_created() -> anyhow::Result<()> {
        let path = std::env::temp_dir()
            .join(format!("dicejudge_trace_{}.jsonl", std::process::id()));
        let config = JudgeConfig {
            trace: Some(path.clone()),
            ..JudgeConfig::new(1)
        };
        drop(config.observer()?);
        assert!(path.exists());
        std::fs::remove_file(&path)?;
        Ok(())
    }
}
