use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::consts::{BACKUP_TIMESTAMP_FORMAT, SQL_EXT, SQL_GZ_EXT};
use crate::error::AppError;
use crate::utils::Timezone;

/// `<database>_backup_<YYYY-MM-DD_HH-MM>`, without extension
///
/// Granularity is one minute: two runs within the same minute collide.
pub(crate) fn backup_stem(database: &str, now: DateTime<Utc>, timezone: Timezone) -> String {
    format!(
        "{database}_backup_{}",
        timezone.format(now, BACKUP_TIMESTAMP_FORMAT)
    )
}

pub(crate) fn sql_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}.{SQL_EXT}"))
}

pub(crate) fn gz_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}.{SQL_GZ_EXT}"))
}

/// Glob pattern matching every compressed backup in `dir`
///
/// Glob patterns are UTF-8, so a directory that is not cannot be matched.
pub(crate) fn gz_pattern(dir: &Path) -> Result<String, AppError> {
    let dir_str = dir.to_str().ok_or_else(|| AppError::Pattern {
        dir: dir.to_path_buf(),
        reason: "path is not valid UTF-8".to_string(),
    })?;
    let escaped = glob::Pattern::escape(dir_str);
    Ok(format!("{escaped}/*.{SQL_GZ_EXT}"))
}
