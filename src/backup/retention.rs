use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::AppError;

use super::naming::gz_pattern;

/// A compressed backup found on disk
#[derive(Debug, Clone)]
pub(crate) struct BackupEntry {
    pub(crate) path: PathBuf,
    pub(crate) name: String,
    pub(crate) size: u64,
    pub(crate) modified: SystemTime,
}

/// All `*.sql.gz` files in `dir`, newest first by modification time
///
/// A missing directory yields an empty list.
pub(crate) fn list_backups(dir: &Path) -> Result<Vec<BackupEntry>, AppError> {
    let pattern = gz_pattern(dir)?;
    let paths = glob::glob(&pattern).map_err(|e| AppError::Pattern {
        dir: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut entries = Vec::new();
    for path in paths.flatten() {
        let Ok(meta) = fs::metadata(&path) else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        entries.push(BackupEntry {
            path,
            name,
            size: meta.len(),
            modified,
        });
    }

    // Same mtime: the later name (later timestamp) counts as newer
    entries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
    Ok(entries)
}

/// Entries beyond the `keep` most recent
pub(crate) fn expired(entries: &[BackupEntry], keep: usize) -> &[BackupEntry] {
    entries.get(keep..).unwrap_or(&[])
}

/// Delete every backup beyond the `keep` most recent, returning what was
/// (or, with `dry_run`, would be) removed
pub(crate) fn prune(dir: &Path, keep: usize, dry_run: bool) -> Result<Vec<BackupEntry>, AppError> {
    let entries = list_backups(dir)?;
    let doomed = expired(&entries, keep).to_vec();

    if dry_run {
        return Ok(doomed);
    }
    for entry in &doomed {
        fs::remove_file(&entry.path).map_err(|e| {
            AppError::io(format!("Failed to remove {}", entry.path.display()), e)
        })?;
        tracing::debug!(file = %entry.name, "pruned backup");
    }
    Ok(doomed)
}
