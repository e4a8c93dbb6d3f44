//! Bounded subprocess execution.
//!
//! External tools are opaque executables that may hang, crash, or be absent
//! entirely. [`run_bounded`] gives every invocation a hard deadline and a
//! typed outcome; callers map each variant to a failed or successful
//! `ResultSet` and never see a panic or a zombie child.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Poll interval while waiting for the child to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Outcome of one bounded subprocess invocation.
#[derive(Debug)]
pub enum ExecOutcome {
    /// Process ran to completion (exit code may still be non-zero).
    Completed {
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
        /// Process exit code; killed-by-signal reports as -1.
        exit_code: i32,
    },
    /// Deadline elapsed; the child was killed and reaped.
    TimedOut {
        /// The deadline that was exceeded.
        limit: Duration,
    },
    /// The process could not be started at all (binary missing, permission).
    LaunchFailed {
        /// OS-level failure description.
        reason: String,
    },
}

/// Run `program` with `args`, killing it if it outlives `limit`.
///
/// Stdout and stderr are captured; stdin is closed. Each pipe is drained
/// by its own reader thread while the child runs, so a tool that writes
/// more than the pipe buffer cannot block and masquerade as a timeout.
pub fn run_bounded(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    limit: Duration,
) -> ExecOutcome {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return ExecOutcome::LaunchFailed {
                reason: e.to_string(),
            }
        }
    };

    let stdout_reader = spawn_reader(child.stdout.take());
    let stderr_reader = spawn_reader(child.stderr.take());

    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return ExecOutcome::Completed {
                    stdout: join_reader(stdout_reader),
                    stderr: join_reader(stderr_reader),
                    exit_code: status.code().unwrap_or(-1),
                };
            }
            Ok(None) => {
                if started.elapsed() >= limit {
                    // Kill and reap; a failed kill means it already exited,
                    // and the next try_wait would pick that up, but the
                    // deadline has passed either way. The reader threads
                    // see EOF once the pipes close and finish on their own.
                    let _ = child.kill();
                    let _ = child.wait();
                    tracing::warn!("Subprocess '{program}' killed after {limit:?}");
                    return ExecOutcome::TimedOut { limit };
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return ExecOutcome::LaunchFailed {
                    reason: e.to_string(),
                };
            }
        }
    }
}

/// Drain a pipe on its own thread so the child never blocks on a full
/// pipe buffer while the parent polls for exit.
fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buf);
        }
        buf
    })
}

fn join_reader(handle: JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}
