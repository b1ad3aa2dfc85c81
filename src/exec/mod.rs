//! External command execution
//!
//! Every operation of the tool is expressed as one or more `Invocation`s
//! handed to a `Runner`. `SystemRunner` spawns real processes; tests swap in
//! a recording runner.

mod system;

use std::fmt;
use std::fs::File;

use crate::error::ExecError;

pub(crate) use system::SystemRunner;

/// A single external program call
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Invocation {
    pub(crate) program: String,
    pub(crate) args: Vec<String>,
}

impl Invocation {
    pub(crate) fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub(crate) fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub(crate) fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Executes invocations
pub(crate) trait Runner {
    /// Run with inherited stdio, failing on a non-zero exit
    fn run(&self, invocation: &Invocation) -> Result<(), ExecError>;

    /// Run with stdout redirected into `out`, failing on a non-zero exit
    fn run_to_file(&self, invocation: &Invocation, out: File) -> Result<(), ExecError>;
}

/// Run a fixed sequence, stopping at the first failure. Earlier steps are
/// not undone.
pub(crate) fn run_sequence(runner: &dyn Runner, steps: &[Invocation]) -> Result<(), ExecError> {
    for (i, step) in steps.iter().enumerate() {
        tracing::info!(step = i + 1, total = steps.len(), command = %step, "running");
        runner.run(step)?;
    }
    Ok(())
}
