//! Pipeline steps.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One external process invocation with fixed arguments.
///
/// Arguments are stored as discrete tokens and are never re-split, so an
/// argument containing spaces reaches the program intact.
///
/// # Example
///
/// ```
/// use benchforge_core::PipelineStep;
///
/// let step = PipelineStep::new("bin/CountingBenchmark")
///     .arg("--numIterations")
///     .arg("4")
///     .arg("a path/with spaces");
///
/// assert_eq!(step.program, "bin/CountingBenchmark");
/// assert_eq!(step.args.len(), 3);
/// assert_eq!(step.args[2], "a path/with spaces");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineStep {
    /// Executable name or path.
    pub program: String,
    /// Literal argument tokens.
    #[serde(default)]
    pub args: Vec<String>,
}

impl PipelineStep {
    /// Creates a step with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Creates a step from an argument vector whose first token is the program.
    ///
    /// Returns `None` for an empty vector.
    pub fn from_argv<I, T>(argv: I) -> Option<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut tokens = argv.into_iter().map(Into::into);
        let program = tokens.next()?;
        Some(Self {
            program,
            args: tokens.collect(),
        })
    }

    /// Appends one argument token.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several argument tokens.
    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for PipelineStep {
    /// Formats the step for logs, quoting tokens that contain whitespace.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {:?}", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}
