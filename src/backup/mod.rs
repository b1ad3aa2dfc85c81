//! Database backup with bounded retention
//!
//! Dumps one database through `pg_dump` inside its container, gzips the
//! dump in place and prunes the backup directory down to the retention
//! window.

mod compress;
mod naming;
mod retention;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::envfile::EnvFile;
use crate::error::AppError;
use crate::exec::{Invocation, Runner};
use crate::utils::Timezone;

pub(crate) use compress::gzip_in_place;
pub(crate) use naming::backup_stem;
pub(crate) use retention::{BackupEntry, expired, list_backups, prune};

/// Connection parameters read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DbParams {
    /// Container running the database server
    pub(crate) host: String,
    pub(crate) user: String,
    pub(crate) database: String,
}

impl DbParams {
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let require = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(AppError::MissingEnv { key })
        };
        Ok(Self {
            host: require("POSTGRES_HOST")?,
            user: require("POSTGRES_USER")?,
            database: require("POSTGRES_DB")?,
        })
    }

    pub(crate) fn from_env(env: &EnvFile) -> Result<Self, AppError> {
        Self::from_lookup(|key| env.resolve(key))
    }
}

/// Everything a single backup run needs
#[derive(Debug, Clone)]
pub(crate) struct BackupJob {
    pub(crate) docker: String,
    pub(crate) params: DbParams,
    pub(crate) dir: PathBuf,
    pub(crate) keep: usize,
    pub(crate) timezone: Timezone,
}

/// Result of a completed run
#[derive(Debug)]
pub(crate) struct BackupReport {
    pub(crate) archive: PathBuf,
    pub(crate) pruned: Vec<BackupEntry>,
}

impl BackupJob {
    pub(crate) fn dump_invocation(&self) -> Invocation {
        Invocation::new(&self.docker)
            .arg("exec")
            .arg(&self.params.host)
            .arg("pg_dump")
            .arg("-U")
            .arg(&self.params.user)
            .arg(&self.params.database)
    }

    pub(crate) fn stem(&self, now: DateTime<Utc>) -> String {
        backup_stem(&self.params.database, now, self.timezone)
    }

    pub(crate) fn archive_path(&self, now: DateTime<Utc>) -> PathBuf {
        naming::gz_path(&self.dir, &self.stem(now))
    }

    /// Backups a run at `now` would delete
    ///
    /// The new archive is always the newest and takes one slot. A same-minute
    /// archive is overwritten in place, so it is not counted twice.
    pub(crate) fn planned_prune(&self, now: DateTime<Utc>) -> Result<Vec<BackupEntry>, AppError> {
        let archive = self.archive_path(now);
        let others: Vec<BackupEntry> = list_backups(&self.dir)?
            .into_iter()
            .filter(|e| e.path != archive)
            .collect();
        Ok(expired(&others, self.keep.saturating_sub(1)).to_vec())
    }

    /// Dump, compress, prune
    ///
    /// A failed dump removes its partial output and skips pruning, so a bad
    /// run never evicts a good backup.
    pub(crate) fn run(&self, runner: &dyn Runner, now: DateTime<Utc>) -> Result<BackupReport, AppError> {
        ensure_dir(&self.dir)?;

        let stem = self.stem(now);
        let sql = naming::sql_path(&self.dir, &stem);
        let archive = naming::gz_path(&self.dir, &stem);
        if archive.exists() {
            tracing::warn!(
                file = %archive.display(),
                "backup from the same minute already exists and will be overwritten"
            );
        }

        let out = File::create(&sql)
            .map_err(|e| AppError::io(format!("Failed to create {}", sql.display()), e))?;
        let dump = self.dump_invocation();
        tracing::info!(command = %dump, file = %sql.display(), "dumping database");
        if let Err(e) = runner.run_to_file(&dump, out) {
            if let Err(rm) = fs::remove_file(&sql) {
                tracing::warn!("Failed to remove partial dump {}: {}", sql.display(), rm);
            }
            return Err(e.into());
        }

        let archive = gzip_in_place(&sql)?;
        let pruned = prune(&self.dir, self.keep, false)?;
        Ok(BackupReport { archive, pruned })
    }
}

fn ensure_dir(dir: &Path) -> Result<(), AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::io(format!("Failed to create {}", dir.display()), e))
}
