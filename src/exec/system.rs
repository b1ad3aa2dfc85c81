use std::fs::File;
use std::io::Read;
use std::process::{Command, Stdio};

use crate::error::ExecError;

use super::{Invocation, Runner};

/// Spawns real processes
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SystemRunner;

impl SystemRunner {
    fn command(invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        cmd
    }

    fn spawn_error(invocation: &Invocation, e: std::io::Error) -> ExecError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ExecError::NotFound {
                program: invocation.program.clone(),
            }
        } else {
            ExecError::Spawn {
                program: invocation.program.clone(),
                source: e,
            }
        }
    }
}

impl Runner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), ExecError> {
        tracing::debug!(command = %invocation, "spawning");
        let status = Self::command(invocation)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| Self::spawn_error(invocation, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(ExecError::CommandFailed {
                command: invocation.to_string(),
                code: status.code(),
                stderr: String::new(),
            })
        }
    }

    fn run_to_file(&self, invocation: &Invocation, out: File) -> Result<(), ExecError> {
        tracing::debug!(command = %invocation, "spawning with redirected stdout");
        let mut child = Self::command(invocation)
            .stdin(Stdio::null())
            .stdout(Stdio::from(out))
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Self::spawn_error(invocation, e))?;

        let mut raw = Vec::new();
        if let Some(mut pipe) = child.stderr.take() {
            let _ = pipe.read_to_end(&mut raw);
        }
        let stderr = String::from_utf8_lossy(&raw).into_owned();

        let status = child.wait().map_err(|e| ExecError::Wait {
            program: invocation.program.clone(),
            source: e,
        })?;

        if status.success() {
            if !stderr.trim().is_empty() {
                tracing::warn!("{}: {}", invocation.program, stderr.trim());
            }
            Ok(())
        } else {
            Err(ExecError::CommandFailed {
                command: invocation.to_string(),
                code: status.code(),
                stderr: stderr.trim().to_string(),
            })
        }
    }
}
