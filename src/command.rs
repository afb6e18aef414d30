// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Synchronous external command gateway.
//!
//! Every tool in this crate shells out to fixed binaries (`pactl`,
//! `systemctl`, `lsblk`, `apt`, ...). This module runs one invocation,
//! captures both output streams and hands back a structured result. A
//! non-zero exit is not an error here - the caller decides whether it
//! matters. Spawn failures and timeouts are folded into the same result
//! shape so call sites have exactly one failure path to handle.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Captured result of one external command invocation.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit code, or `None` if the process never produced one
    /// (spawn failure, timeout, killed by signal).
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// True when the command ran and exited zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Best available error text for dialogs and logs.
    pub fn error_text(&self) -> &str {
        if !self.stderr.trim().is_empty() {
            self.stderr.trim()
        } else {
            self.stdout.trim()
        }
    }

    fn spawn_failure(program: &str, err: &std::io::Error) -> Self {
        Self {
            exit_code: None,
            stdout: String::new(),
            stderr: format!("{}: {}", program, err),
        }
    }
}

/// Run a command to completion, capturing stdout and stderr.
pub fn run(program: &str, args: &[&str]) -> CommandOutput {
    debug!("Running: {} {}", program, args.join(" "));

    let output = match Command::new(program).args(args).output() {
        Ok(out) => out,
        Err(e) => {
            warn!("Failed to spawn '{}': {}", program, e);
            return CommandOutput::spawn_failure(program, &e);
        }
    };

    let result = CommandOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    if !result.success() {
        debug!(
            "'{}' exited with {:?}: {}",
            program,
            result.exit_code,
            result.error_text()
        );
    }

    result
}

/// Run a command with a deadline, killing the child when it expires.
///
/// Polls `try_wait` rather than blocking so the worst-case overshoot is one
/// poll interval. Both output streams are drained on reader threads while
/// waiting; a child that writes more than the OS pipe buffer must never
/// stall against a full pipe and get mistaken for a hang.
pub fn run_with_timeout(program: &str, args: &[&str], timeout: Duration) -> CommandOutput {
    debug!(
        "Running (timeout {:?}): {} {}",
        timeout,
        program,
        args.join(" ")
    );

    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to spawn '{}': {}", program, e);
            return CommandOutput::spawn_failure(program, &e);
        }
    };

    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);
    let collect = |handle: Option<thread::JoinHandle<String>>| {
        handle
            .and_then(|h| h.join().ok())
            .unwrap_or_default()
    };

    let poll_interval = Duration::from_millis(25);
    let deadline = Instant::now() + timeout;

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return CommandOutput {
                    exit_code: status.code(),
                    stdout: collect(stdout_reader),
                    stderr: collect(stderr_reader),
                };
            }
            Ok(None) => {
                if Instant::now() >= deadline {
                    warn!("'{}' timed out after {:?}, killing", program, timeout);
                    let _ = child.kill();
                    let _ = child.wait();
                    // Killing closes the pipes, so the readers finish.
                    let _ = collect(stdout_reader);
                    let _ = collect(stderr_reader);
                    return CommandOutput {
                        exit_code: None,
                        stdout: String::new(),
                        stderr: format!("{}: timed out after {:?}", program, timeout),
                    };
                }
                thread::sleep(poll_interval);
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                let _ = collect(stdout_reader);
                let _ = collect(stderr_reader);
                return CommandOutput::spawn_failure(program, &e);
            }
        }
    }
}

/// Consume one output pipe to completion on its own thread.
fn spawn_reader<R: Read + Send + 'static>(mut source: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = source.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}
