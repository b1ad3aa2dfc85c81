use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Environment file not found: {}", path.display())]
    EnvFileMissing { path: PathBuf },

    #[error("Invalid line {line} in {}: {reason}", path.display())]
    EnvParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Missing required environment variable {key}")]
    MissingEnv { key: &'static str },

    #[error("Invalid timezone: {input}")]
    InvalidTimezone { input: String },

    #[error("Invalid retention {input} (must keep at least 1 backup)")]
    InvalidRetention { input: usize },

    #[error("Invalid backup pattern for {}: {reason}", dir.display())]
    Pattern { dir: PathBuf, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Exec(#[from] ExecError),

    #[error("{0}")]
    Health(#[from] HealthError),
}

impl AppError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Io {
            context: context.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ExecError {
    #[error("{program} not found. Is it installed and on PATH?")]
    NotFound { program: String },

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed ({}): {command}{}", exit_label(*code), stderr_suffix(stderr))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "terminated by signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{stderr}")
    }
}

#[derive(Debug, Error)]
pub(crate) enum HealthError {
    #[error("API unreachable at {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("API unhealthy (HTTP {status}): {body}")]
    Unhealthy { status: u16, body: String },

    #[error("Unexpected health response: {0}")]
    Decode(String),
}
