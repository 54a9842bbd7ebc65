use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use super::{Contestant, guard};
use crate::error::JudgeError;

/// How long a contestant may take to exit once its input is closed.
const FINISH_GRACE: Duration = Duration::from_secs(1);
/// How long to wait for an exit status after the output stream ended.
const EXIT_WAIT: Duration = Duration::from_millis(200);

/// A contestant running as a child process, launched with `sh -c`.
///
/// Stdout is read on a background thread and handed over line by line, so a
/// per-round deadline can be applied to every read. The child is killed as a
/// process group when the run fails or the value is dropped.
pub struct ProcessContestant {
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    lines: Receiver<io::Result<String>>,
    reader: Option<JoinHandle<()>>,
    timeout: Duration,
    status: Option<ExitStatus>,
}

impl ProcessContestant {
    pub fn spawn(command: &str, timeout: Duration) -> Result<Self, JudgeError> {
        let mut child = spawn_shell(command)
            .map_err(|e| JudgeError::process(format!("failed to launch `{}`: {}", command, e)))?;
        guard::register(child.id());

        let (tx, rx) = mpsc::channel();
        let reader = child.stdout.take().map(|out| spawn_line_reader(out, tx));
        let stdin = child.stdin.take().map(BufWriter::new);
        let contestant = Self {
            child,
            stdin,
            lines: rx,
            reader,
            timeout,
            status: None,
        };
        if contestant.stdin.is_none() || contestant.reader.is_none() {
            return Err(JudgeError::process("child is missing a stdio pipe"));
        }
        Ok(contestant)
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Exit status, once the child has been reaped.
    pub fn status(&self) -> Option<ExitStatus> {
        self.status
    }

    fn wait_bounded(&mut self, limit: Duration) -> Option<ExitStatus> {
        if self.status.is_some() {
            return self.status;
        }
        let deadline = Instant::now() + limit;
        while Instant::now() < deadline {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    self.reap(status);
                    return Some(status);
                }
                Ok(None) => std::thread::sleep(Duration::from_millis(10)),
                Err(_) => break,
            }
        }
        None
    }

    fn reap(&mut self, status: ExitStatus) {
        self.status = Some(status);
        guard::unregister(self.child.id());
        if let Some(h) = self.reader.take() {
            join_with_timeout(h, FINISH_GRACE);
        }
    }

    fn kill(&mut self) {
        self.stdin = None;
        if self.status.is_some() {
            return;
        }
        kill_group(self.child.id());
        let _ = self.child.kill();
        match self.child.wait() {
            Ok(status) => self.reap(status),
            Err(e) => {
                eprintln!("[judge] failed to reap contestant {}: {}", self.child.id(), e);
                guard::unregister(self.child.id());
            }
        }
    }
}

impl Contestant for ProcessContestant {
    fn send(&mut self, line: &str) -> Result<(), JudgeError> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Ok(());
        };
        let written = writeln!(stdin, "{}", line).and_then(|_| stdin.flush());
        match written {
            Ok(()) => Ok(()),
            // The contestant stopped reading; if it is really gone the next
            // read reports it.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                self.stdin = None;
                Ok(())
            }
            Err(e) => Err(JudgeError::process(format!(
                "failed to write to contestant: {}",
                e
            ))),
        }
    }

    fn recv(&mut self, round: usize) -> Result<String, JudgeError> {
        match self.lines.recv_timeout(self.timeout) {
            Ok(Ok(line)) => Ok(line),
            Ok(Err(e)) => Err(JudgeError::process(format!(
                "round {}: failed to read contestant output: {}",
                round, e
            ))),
            Err(RecvTimeoutError::Timeout) => Err(JudgeError::Timeout {
                round,
                limit: self.timeout,
            }),
            Err(RecvTimeoutError::Disconnected) => {
                let exit = match self.wait_bounded(EXIT_WAIT) {
                    Some(status) => format!(" ({})", status),
                    None => String::new(),
                };
                Err(JudgeError::process(format!(
                    "round {}: contestant closed its output{}",
                    round, exit
                )))
            }
        }
    }

    fn finish(&mut self) {
        self.stdin = None;
        match self.wait_bounded(FINISH_GRACE) {
            Some(status) if !status.success() => {
                eprintln!("[judge] contestant exited with {}", status);
            }
            Some(_) => {}
            None => {
                eprintln!("[judge] contestant still running after the last round; killing it");
                self.kill();
            }
        }
    }

    fn abort(&mut self) {
        self.kill();
    }
}

impl Drop for ProcessContestant {
    fn drop(&mut self) {
        self.kill();
    }
}

fn spawn_shell(command: &str) -> io::Result<Child> {
    let mut cmd = Command::new("sh");
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        unsafe {
            cmd.pre_exec(|| {
                libc::setsid();
                Ok(())
            });
        }
    }
    cmd.arg("-c")
        .arg(command)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
}

#[cfg(unix)]
pub(super) fn kill_group(pid: u32) {
    // The child called setsid, so its pid is also its process group id.
    unsafe {
        libc::kill(-(pid as i32), libc::SIGKILL);
    }
}

#[cfg(not(unix))]
pub(super) fn kill_group(_pid: u32) {}

fn spawn_line_reader<R: Read + Send + 'static>(
    pipe: R,
    tx: Sender<io::Result<String>>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut buf: Vec<u8> = Vec::with_capacity(64);
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf)
                        .trim_end_matches(['\n', '\r'])
                        .to_string();
                    if tx.send(Ok(line)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                    break;
                }
            }
        }
    })
}

fn join_with_timeout(h: JoinHandle<()>, dur: Duration) {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = h.join();
        let _ = tx.send(());
    });
    let _ = rx.recv_timeout(dur);
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::judge::DiceJudge;
    use crate::score::Report;
    use crate::trace::NoTrace;
    use anyhow::Result;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn process_alive(pid: u32) -> bool {
        unsafe { libc::kill(pid as i32, 0) == 0 }
    }

    #[test]
    fn constant_contestant_matches_golden_score() -> Result<()> {
        let script = concat!(
            r#"read n m; i=0; while [ "$i" -lt "$m" ]; do "#,
            r#"echo 1 2 3 4 5 6; read mv v p; i=$((i+1)); done"#,
        );
        let mut contestant = ProcessContestant::spawn(script, TIMEOUT)?;
        let report = DiceJudge::new(1).run(&mut contestant, &mut NoTrace)?;
        assert_eq!(
            report,
            Report {
                score: 722670,
                goal: 33
            }
        );
        assert!(contestant.status().is_some_and(|s| s.success()));
        Ok(())
    }

    #[test]
    fn echoes_launch_line() -> Result<()> {
        let mut contestant = ProcessContestant::spawn("read line; echo \"got $line\"", TIMEOUT)?;
        contestant.send("500 5000")?;
        assert_eq!(contestant.recv(0)?, "got 500 5000");
        Ok(())
    }

    #[test]
    fn silent_contestant_times_out_and_is_killed() -> Result<()> {
        let mut contestant =
            ProcessContestant::spawn("read n m; sleep 30", Duration::from_millis(300))?;
        let pid = contestant.id();
        let err = DiceJudge::new(1)
            .run(&mut contestant, &mut NoTrace)
            .unwrap_err();
        assert!(matches!(err, JudgeError::Timeout { round: 0, .. }), "{}", err);
        assert!(contestant.status().is_some());
        assert!(!process_alive(pid));
        Ok(())
    }

    #[test]
    fn early_exit_is_a_process_error() -> Result<()> {
        let script = "read n m; echo 1 2 3 4 5 6; read fb; exit 3";
        let mut contestant = ProcessContestant::spawn(script, TIMEOUT)?;
        let err = DiceJudge::new(1)
            .run(&mut contestant, &mut NoTrace)
            .unwrap_err();
        match err {
            JudgeError::Process { message } => {
                assert!(message.starts_with("round 1:"), "{}", message)
            }
            other => panic!("unexpected error: {}", other),
        }
        Ok(())
    }

    #[test]
    fn missing_program_is_a_process_error() -> Result<()> {
        let mut contestant =
            ProcessContestant::spawn("exec ./definitely-not-a-contestant 2>/dev/null", TIMEOUT)?;
        let err = DiceJudge::new(1)
            .run(&mut contestant, &mut NoTrace)
            .unwrap_err();
        assert!(matches!(err, JudgeError::Process { .. }), "{}", err);
        Ok(())
    }

    #[test]
    fn two_changes_stop_the_run() -> Result<()> {
        let script = "read n m; echo 1 2 3 4 5 6; read fb; echo 6 6 3 4 5 6; sleep 30";
        let mut contestant = ProcessContestant::spawn(script, TIMEOUT)?;
        let pid = contestant.id();
        let err = DiceJudge::new(1)
            .run(&mut contestant, &mut NoTrace)
            .unwrap_err();
        assert!(
            matches!(err, JudgeError::TooManyChanges { round: 1, count: 2, .. }),
            "{}",
            err
        );
        assert!(!process_alive(pid));
        Ok(())
    }

    #[test]
    fn drop_kills_the_whole_group() -> Result<()> {
        let contestant = ProcessContestant::spawn("sleep 30 | cat", TIMEOUT)?;
        let pid = contestant.id();
        assert!(process_alive(pid));
        drop(contestant);
        assert!(!process_alive(pid));
        Ok(())
    }
}
