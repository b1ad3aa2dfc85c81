//! `.env` file loading
//!
//! Supports `KEY=VALUE`, `export KEY=VALUE`, `#` comments, blank lines and
//! single or double quoted values. Values set in the file win; the process
//! environment only fills keys the file does not set.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

#[derive(Debug, Default, Clone)]
pub(crate) struct EnvFile {
    path: PathBuf,
    vars: Vec<(String, String)>,
}

impl EnvFile {
    pub(crate) fn load(path: &Path) -> Result<Self, AppError> {
        if !path.is_file() {
            return Err(AppError::EnvFileMissing {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::io(format!("Failed to read {}", path.display()), e))?;
        let env = Self::parse(&content, path)?;
        tracing::debug!(path = %env.path().display(), vars = env.len(), "loaded env file");
        Ok(env)
    }

    pub(crate) fn parse(content: &str, path: &Path) -> Result<Self, AppError> {
        let mut vars: Vec<(String, String)> = Vec::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line).trim_start();

            let parse_err = |reason: &str| AppError::EnvParse {
                path: path.to_path_buf(),
                line: idx + 1,
                reason: reason.to_string(),
            };

            let Some((key, value)) = line.split_once('=') else {
                return Err(parse_err("missing '='"));
            };
            let key = key.trim();
            if !is_valid_key(key) {
                return Err(parse_err("invalid variable name"));
            }
            let value = parse_value(value.trim()).map_err(parse_err)?;

            // Later assignments win, like sourcing the file in a shell
            if let Some(existing) = vars.iter_mut().find(|(k, _)| k == key) {
                existing.1 = value;
            } else {
                vars.push((key.to_string(), value));
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            vars,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Value as written in the file, ignoring the process environment
    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Effective value: the file first, then the process environment
    pub(crate) fn resolve(&self, key: &str) -> Option<String> {
        self.resolve_with(key, |k| std::env::var(k).ok())
    }

    fn resolve_with<F>(&self, key: &str, process_env: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        match self.get(key) {
            Some(v) => Some(v.to_string()),
            None => process_env(key).filter(|v| !v.is_empty()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.vars.len()
    }
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_value(value: &str) -> Result<String, &'static str> {
    if let Some(rest) = value.strip_prefix('\'') {
        let end = rest.find('\'').ok_or("unterminated quote")?;
        check_trailing(&rest[end + 1..])?;
        return Ok(rest[..end].to_string());
    }
    if let Some(rest) = value.strip_prefix('"') {
        let mut out = String::new();
        let mut chars = rest.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    check_trailing(&rest[i + 1..])?;
                    return Ok(out);
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, '"')) => out.push('"'),
                    Some((_, '\\')) => out.push('\\'),
                    Some((_, other)) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => return Err("unterminated quote"),
                },
                _ => out.push(c),
            }
        }
        return Err("unterminated quote");
    }
    // Unquoted: an inline comment needs whitespace before '#'
    let value = match value.find(" #") {
        Some(pos) => value[..pos].trim_end(),
        None => value,
    };
    Ok(value.to_string())
}

/// Only whitespace or a comment may follow a closing quote
fn check_trailing(rest: &str) -> Result<(), &'static str> {
    let rest = rest.trim_start();
    if rest.is_empty() || rest.starts_with('#') {
        Ok(())
    } else {
        Err("unexpected text after closing quote")
    }
}
