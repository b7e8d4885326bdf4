//! OS process executor.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use benchforge_core::{CommandExecutor, ExecError, PipelineStep, RunResult};
use tracing::{debug, trace};

/// Default interval between exit-status polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long to wait for pipe readers after a timeout kill.
const DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Interval between checks on a pipe reader.
const DRAIN_POLL: Duration = Duration::from_millis(5);

/// Runs pipeline steps as OS processes.
///
/// Arguments are passed to [`Command::args`] verbatim, so no shell ever
/// re-tokenizes them. Stdout and stderr are drained on helper threads while
/// the calling thread polls for exit, which keeps a chatty child from
/// blocking on a full pipe.
///
/// The timeout covers the child and anything holding its output pipes. On
/// Unix the child leads its own process group, and a timeout kills the
/// whole group before reaping the child.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    poll_interval: Duration,
}

impl ProcessExecutor {
    /// Creates an executor with the default poll interval.
    pub fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets the interval between exit-status polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Polls `child` until it exits or `deadline` passes.
    ///
    /// Returns `Ok(None)` if the child was killed at the deadline.
    fn wait_until(
        &self,
        child: &mut Child,
        deadline: Option<Instant>,
    ) -> io::Result<Option<ExitStatus>> {
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            let now = Instant::now();
            let nap = match deadline {
                Some(deadline) if now >= deadline => {
                    kill_tree(child);
                    return Ok(None);
                }
                Some(deadline) => self.poll_interval.min(deadline - now),
                None => self.poll_interval,
            };
            thread::sleep(nap);
        }
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor for ProcessExecutor {
    fn execute(
        &self,
        step: &PipelineStep,
        working_dir: Option<&Path>,
        timeout: Duration,
    ) -> Result<RunResult, ExecError> {
        let mut command = Command::new(&step.program);
        command
            .args(&step.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }
        own_process_group(&mut command);

        debug!(event = "process_spawn", command = %step, timeout_ms = timeout.as_millis() as u64);

        let start = Instant::now();
        let deadline = start.checked_add(timeout);
        let mut child = command.spawn().map_err(|source| ExecError::Launch {
            program: step.program.clone(),
            source,
        })?;
        let mut stdout = OutputDrain::spawn(child.stdout.take());
        let mut stderr = OutputDrain::spawn(child.stderr.take());

        let status = match self.wait_until(&mut child, deadline) {
            Ok(status) => status,
            Err(source) => {
                kill_tree(&mut child);
                return Err(ExecError::Wait {
                    program: step.program.clone(),
                    source,
                });
            }
        };

        // Descendants that inherited the pipes can keep them open after the
        // child exits; they get the rest of the budget and no more.
        let closed = match status {
            Some(_) => {
                let stdout_closed = stdout.settle(deadline);
                let stderr_closed = stderr.settle(deadline);
                stdout_closed && stderr_closed
            }
            None => false,
        };
        let elapsed = start.elapsed();

        if closed {
            let result = RunResult {
                program: step.program.clone(),
                stdout: stdout.into_string(),
                stderr: stderr.into_string(),
                exit_code: status.and_then(|status| status.code()),
                elapsed,
            };
            trace!(
                event = "process_exit",
                program = %step.program,
                exit_code = ?result.exit_code,
                stdout_bytes = result.stdout.len(),
                stderr_bytes = result.stderr.len(),
            );
            return Ok(result);
        }

        if status.is_some() {
            debug!(event = "pipe_held_open", program = %step.program);
            kill_tree(&mut child);
        }
        let grace = Instant::now().checked_add(DRAIN_GRACE);
        stdout.settle(grace);
        stderr.settle(grace);
        let partial = RunResult {
            program: step.program.clone(),
            stdout: stdout.into_string(),
            stderr: stderr.into_string(),
            exit_code: status.and_then(|status| status.code()),
            elapsed,
        };
        Err(ExecError::Timeout {
            program: step.program.clone(),
            timeout,
            partial: Box::new(partial),
        })
    }
}

/// Puts the child at the head of a new process group, so a kill reaches
/// everything it started.
#[cfg(unix)]
fn own_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    command.process_group(0);
}

#[cfg(not(unix))]
fn own_process_group(_command: &mut Command) {}

/// Kills the child's process group, then the child itself, and reaps it.
///
/// Kill fails harmlessly if the child already exited; wait reaps it either way.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pid) = libc::pid_t::try_from(child.id()) {
            // A negative pid addresses the whole group.
            unsafe {
                libc::kill(-pid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Collects one output pipe on a helper thread.
struct OutputDrain {
    buffer: Arc<Mutex<Vec<u8>>>,
    handle: Option<JoinHandle<()>>,
}

impl OutputDrain {
    fn spawn<R: Read + Send + 'static>(source: Option<R>) -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let handle = source.map(|mut reader| {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                let mut chunk = [0u8; 8192];
                loop {
                    match reader.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => lock(&buffer).extend_from_slice(&chunk[..n]),
                        Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                        Err(_) => break,
                    }
                }
            })
        });
        Self { buffer, handle }
    }

    /// Waits until the pipe closes or `deadline` passes, and reports whether
    /// it closed.
    ///
    /// A reader still blocked at the deadline stays attached; it finishes
    /// on its own once the last writer is gone.
    fn settle(&mut self, deadline: Option<Instant>) -> bool {
        let Some(handle) = self.handle.take() else {
            return true;
        };
        let Some(deadline) = deadline else {
            let _ = handle.join();
            return true;
        };
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                self.handle = Some(handle);
                return false;
            }
            thread::sleep(DRAIN_POLL);
        }
        let _ = handle.join();
        true
    }

    /// Returns everything read so far.
    fn into_string(self) -> String {
        String::from_utf8_lossy(&lock(&self.buffer)).into_owned()
    }
}

fn lock(buffer: &Mutex<Vec<u8>>) -> MutexGuard<'_, Vec<u8>> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}
