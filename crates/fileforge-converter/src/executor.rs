//! Supervised execution of external converter processes.
//!
//! Every office-suite and transcoder invocation goes through
//! [`ProcessSupervisor::run`], which races process exit against a deadline
//! and the server-wide cancellation token. The child is killed on expiry,
//! on cancellation, and (through `kill_on_drop`) when the request future is
//! dropped mid-flight. On unix the child leads its own process group so
//! that helpers it forks are killed with it.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Longest slice of process output carried into an error message.
const MAX_OUTPUT_CHARS: usize = 4000;

/// Errors from supervised process execution.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The program could not be started.
    #[error("Failed to start {program}: {source}")]
    Spawn {
        /// Program as invoked.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The deadline elapsed and the process was killed.
    #[error("{program} timed out after {timeout_seconds} seconds")]
    Timeout {
        /// Program as invoked.
        program: String,
        /// The deadline that elapsed.
        timeout_seconds: u64,
    },

    /// The process exited with a non-zero status.
    #[error("{program} exited with code {code}")]
    ProcessFailed {
        /// Program as invoked.
        program: String,
        /// Exit code, `-1` if terminated by a signal.
        code: i32,
        /// Combined stdout and stderr.
        output: String,
    },

    /// The cancellation token fired and the process was killed.
    #[error("Process cancelled")]
    Cancelled,

    /// IO error while waiting on the process.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Captured output of a successful run.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
    /// Wall time of the run.
    pub elapsed: Duration,
}

impl ProcessOutput {
    /// Stdout followed by stderr, as a converter's combined log.
    pub fn combined(&self) -> String {
        combine(&self.stdout, &self.stderr)
    }
}

/// Runs external programs with a deadline and a cancellation token.
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    cancel: CancellationToken,
}

impl ProcessSupervisor {
    /// Create a supervisor bound to the given shutdown token.
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// The shutdown token processes are bound to.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run `program args...` to completion.
    ///
    /// Stdout and stderr are drained concurrently while the process runs so
    /// a chatty converter cannot block on a full pipe.
    pub async fn run<I, S>(
        &self,
        program: &str,
        args: I,
        working_dir: Option<&Path>,
        timeout: Duration,
    ) -> Result<ProcessOutput, ExecutorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        if self.cancel.is_cancelled() {
            return Err(ExecutorError::Cancelled);
        }

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        #[cfg(unix)]
        cmd.process_group(0);

        #[cfg(windows)]
        {
            const CREATE_NO_WINDOW: u32 = 0x08000000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        debug!(
            program = %program,
            timeout_s = timeout.as_secs(),
            "Spawning converter process"
        );

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|source| ExecutorError::Spawn {
            program: program.to_string(),
            source,
        })?;
        let group = child.id();

        let stdout_task = drain(child.stdout.take());
        let stderr_task = drain(child.stderr.take());

        // The deadline covers the output drains too: a helper forked by the
        // converter can keep the pipes open after the direct child exits.
        let finished = tokio::select! {
            finished = tokio::time::timeout(timeout, async {
                let status = child.wait().await?;
                let stdout = collect(stdout_task).await;
                let stderr = collect(stderr_task).await;
                Ok::<_, std::io::Error>((status, stdout, stderr))
            }) => finished,
            _ = self.cancel.cancelled() => {
                info!(program = %program, "Shutdown requested, killing converter process");
                kill(&mut child, group, program).await;
                return Err(ExecutorError::Cancelled);
            }
        };

        let Ok(finished) = finished else {
            error!(
                program = %program,
                timeout_s = timeout.as_secs(),
                "Converter process timed out, killing"
            );
            kill(&mut child, group, program).await;
            return Err(ExecutorError::Timeout {
                program: program.to_string(),
                timeout_seconds: timeout.as_secs(),
            });
        };

        let (status, stdout, stderr) = finished?;
        let elapsed = start.elapsed();

        if status.success() {
            info!(
                program = %program,
                elapsed_ms = elapsed.as_millis() as u64,
                "Converter process completed"
            );
            Ok(ProcessOutput { stdout, stderr, elapsed })
        } else {
            let code = status.code().unwrap_or(-1);
            let output = truncate(combine(&stdout, &stderr));
            error!(
                program = %program,
                code = code,
                elapsed_ms = elapsed.as_millis() as u64,
                output = %output,
                "Converter process failed"
            );
            Err(ExecutorError::ProcessFailed {
                program: program.to_string(),
                code,
                output,
            })
        }
    }

    /// Whether `program` starts and exits 0 within `timeout`.
    pub async fn probe<I, S>(&self, program: &str, args: I, timeout: Duration) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        match self.run(program, args, None, timeout).await {
            Ok(_) => true,
            Err(e) => {
                debug!(program = %program, error = %e, "Probe failed");
                false
            }
        }
    }
}

/// Kill the child and, on unix, every process left in its process group.
async fn kill(child: &mut tokio::process::Child, group: Option<u32>, program: &str) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        if let Some(pgid) = group.and_then(|id| i32::try_from(id).ok()) {
            match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
                Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
                Err(e) => warn!(program = %program, error = %e, "Failed to kill converter process group"),
            }
        }
    }
    #[cfg(not(unix))]
    let _ = group;

    if matches!(child.try_wait(), Ok(Some(_))) {
        return;
    }
    if let Err(e) = child.kill().await {
        warn!(program = %program, error = %e, "Failed to kill converter process");
    }
}

fn drain<R>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    pipe.map(|mut reader| {
        tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = reader.read_to_end(&mut buf).await;
            buf
        })
    })
}

async fn collect(task: Option<JoinHandle<Vec<u8>>>) -> String {
    match task {
        Some(handle) => handle
            .await
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default(),
        None => String::new(),
    }
}

fn combine(stdout: &str, stderr: &str) -> String {
    match (stdout.trim().is_empty(), stderr.trim().is_empty()) {
        (true, true) => String::new(),
        (false, true) => stdout.trim().to_string(),
        (true, false) => stderr.trim().to_string(),
        (false, false) => format!("{}\n{}", stdout.trim(), stderr.trim()),
    }
}

fn truncate(output: String) -> String {
    if output.chars().count() <= MAX_OUTPUT_CHARS {
        output
    } else {
        output.chars().take(MAX_OUTPUT_CHARS).collect()
    }
}
