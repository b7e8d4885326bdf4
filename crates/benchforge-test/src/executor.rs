//! Scripted command executor.

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use benchforge_core::{CommandExecutor, ExecError, PipelineStep, RunResult};

/// Canned outcome of one scripted invocation.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Process ran and exited with `exit_code`.
    Exit {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
    /// Executable could not be launched.
    LaunchFailure,
    /// Process exceeded its budget after printing `stdout`.
    Timeout { stdout: String },
}

impl Reply {
    /// Exit status 0 with no output.
    pub fn success() -> Self {
        Self::exit(0)
    }

    /// Exit with `exit_code` and no output.
    pub fn exit(exit_code: i32) -> Self {
        Reply::Exit {
            exit_code,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Exit status 0 printing `stdout`.
    pub fn stdout(stdout: impl Into<String>) -> Self {
        Reply::Exit {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Sets stderr on an [`Reply::Exit`] reply.
    pub fn with_stderr(self, text: impl Into<String>) -> Self {
        match self {
            Reply::Exit {
                exit_code, stdout, ..
            } => Reply::Exit {
                exit_code,
                stdout,
                stderr: text.into(),
            },
            other => other,
        }
    }

    fn into_result(self, step: &PipelineStep, timeout: Duration) -> Result<RunResult, ExecError> {
        match self {
            Reply::Exit {
                exit_code,
                stdout,
                stderr,
            } => Ok(RunResult::exited(step.program.clone(), exit_code)
                .with_stdout(stdout)
                .with_stderr(stderr)
                .with_elapsed(Duration::from_millis(1))),
            Reply::LaunchFailure => Err(ExecError::Launch {
                program: step.program.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "scripted launch failure"),
            }),
            Reply::Timeout { stdout } => Err(ExecError::Timeout {
                program: step.program.clone(),
                timeout,
                partial: Box::new(RunResult {
                    program: step.program.clone(),
                    stdout,
                    stderr: String::new(),
                    exit_code: None,
                    elapsed: timeout,
                }),
            }),
        }
    }
}

#[derive(Debug)]
enum Matcher {
    Command(PipelineStep),
    Program(String),
}

impl Matcher {
    fn matches(&self, step: &PipelineStep) -> bool {
        match self {
            Matcher::Command(expected) => expected == step,
            Matcher::Program(program) => program == &step.program,
        }
    }

    fn is_exact(&self) -> bool {
        matches!(self, Matcher::Command(_))
    }
}

#[derive(Debug)]
struct Rule {
    matcher: Matcher,
    replies: Vec<Reply>,
    served: AtomicUsize,
}

impl Rule {
    // Replies are served in order; the last one repeats.
    fn next_reply(&self) -> Reply {
        let index = self.served.fetch_add(1, Ordering::Relaxed);
        self.replies[index.min(self.replies.len() - 1)].clone()
    }
}

/// A [`CommandExecutor`] that answers from a script and records every call.
///
/// Exact command rules win over program rules; unmatched steps succeed with
/// no output.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use benchforge_core::{CommandExecutor, PipelineStep};
/// use benchforge_test::{Reply, ScriptedExecutor};
///
/// let executor = ScriptedExecutor::new()
///     .on_program("lfc", Reply::exit(1))
///     .on_command(&["lfc", "ok.lf"], Reply::success());
///
/// let timeout = Duration::from_secs(1);
/// let ok = executor.execute(&PipelineStep::new("lfc").arg("ok.lf"), None, timeout).unwrap();
/// let bad = executor.execute(&PipelineStep::new("lfc").arg("bad.lf"), None, timeout).unwrap();
///
/// assert!(ok.success());
/// assert_eq!(bad.exit_code, Some(1));
/// assert_eq!(executor.call_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    rules: Vec<Rule>,
    calls: Mutex<Vec<PipelineStep>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies to an exact argv (program followed by arguments).
    pub fn on_command(self, argv: &[&str], reply: Reply) -> Self {
        self.on_command_replies(argv, vec![reply])
    }

    /// Replies to an exact argv with successive replies; the last one repeats.
    pub fn on_command_replies(mut self, argv: &[&str], replies: Vec<Reply>) -> Self {
        let step = PipelineStep::from_argv(argv.iter().copied())
            .expect("scripted argv must name a program");
        self.push(Matcher::Command(step), replies);
        self
    }

    /// Replies to any invocation of `program`.
    pub fn on_program(self, program: &str, reply: Reply) -> Self {
        self.on_program_replies(program, vec![reply])
    }

    /// Replies to `program` with successive replies; the last one repeats.
    pub fn on_program_replies(mut self, program: &str, replies: Vec<Reply>) -> Self {
        self.push(Matcher::Program(program.to_string()), replies);
        self
    }

    fn push(&mut self, matcher: Matcher, replies: Vec<Reply>) {
        assert!(!replies.is_empty(), "a scripted rule needs at least one reply");
        self.rules.push(Rule {
            matcher,
            replies,
            served: AtomicUsize::new(0),
        });
    }

    /// Returns every executed step, in call order.
    pub fn calls(&self) -> Vec<PipelineStep> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns how many times `program` was executed.
    pub fn calls_to(&self, program: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|step| step.program == program)
            .count()
    }

    fn rule_for(&self, step: &PipelineStep) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|rule| rule.matcher.is_exact() && rule.matcher.matches(step))
            .or_else(|| self.rules.iter().find(|rule| rule.matcher.matches(step)))
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn execute(
        &self,
        step: &PipelineStep,
        _working_dir: Option<&Path>,
        timeout: Duration,
    ) -> Result<RunResult, ExecError> {
        self.calls.lock().unwrap().push(step.clone());
        let reply = self
            .rule_for(step)
            .map(Rule::next_reply)
            .unwrap_or_else(Reply::success);
        reply.into_result(step, timeout)
    }
}
