use anyhow::{Context, Result, bail};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

use dicejudge::contestant::{self, Contestant, ProcessContestant, Transcript};
use dicejudge::{DiceJudge, JudgeConfig, JudgeError};

/// Interactive judge for the dice-board game.
#[derive(Parser, Debug)]
#[command(name = "dice_judge")]
struct Cli {
    /// Seed for the board and the judge's rolls
    #[arg(long, short = 's')]
    seed: u64,
    /// Shell command that runs the contestant (e.g., the solution binary)
    #[arg(long, short = 'c')]
    command: Option<String>,
    /// Replay recorded contestant lines from a file instead of a command
    #[arg(long, conflicts_with = "command")]
    transcript: Option<PathBuf>,
    /// Dump the board and visit counts to stderr
    #[arg(long, default_value_t = false)]
    info: bool,
    /// Trace every round to stderr
    #[arg(long, default_value_t = false)]
    debug: bool,
    /// Dump visit counts every N rounds
    #[arg(long = "dump-every")]
    dump_every: Option<usize>,
    /// Write a JSONL trace of every round to this file
    #[arg(long)]
    trace: Option<PathBuf>,
    /// Per-round timeout in milliseconds
    #[arg(long = "timeout-ms")]
    timeout_ms: Option<u64>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("[ERROR] {:#}", e);
        let status = e
            .downcast_ref::<JudgeError>()
            .map_or("RE", JudgeError::status);
        eprintln!("!log status {}", status);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = JudgeConfig {
        info: cli.info,
        debug: cli.debug,
        dump_every: cli.dump_every,
        trace: cli.trace.clone(),
        ..JudgeConfig::new(cli.seed)
    }
    .with_env_overrides()?;
    if let Some(ms) = cli.timeout_ms {
        config.round_timeout_ms = ms;
    }

    let mut contestant: Box<dyn Contestant> = match (&cli.command, &cli.transcript) {
        (Some(command), None) => {
            contestant::install_ctrlc_handler();
            Box::new(ProcessContestant::spawn(command, config.round_timeout())?)
        }
        (None, Some(path)) => {
            let file = File::open(path)
                .with_context(|| format!("No such transcript: {}", path.display()))?;
            Box::new(Transcript::from_reader(BufReader::new(file))?)
        }
        _ => bail!("Either --command or --transcript is required"),
    };
    let mut observer = config.observer()?;

    let stime = Instant::now();
    let mut judge = DiceJudge::new(config.seed);
    let result = judge.run(contestant.as_mut(), observer.as_mut());
    eprintln!("!log time {:.3}", stime.elapsed().as_secs_f64());

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            let partial = judge.report();
            eprintln!(
                "[judge] aborted at round {} (score: {} goal: {})",
                judge.round(),
                partial.score,
                partial.goal
            );
            return Err(e.into());
        }
    };
    eprintln!("!log status AC");
    eprintln!("!log score {}", report.score);
    eprintln!("!log goal {}", report.goal);
    println!("{}", report);
    Ok(())
}
