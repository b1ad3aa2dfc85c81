//! CLI subcommand definitions
//!
//! Backup maintenance commands plus the build-automation targets.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::targets::Target;

const DEFAULT_MIGRATION_MESSAGE: &str = "auto migration";

/// Options shared by the backup maintenance commands
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct BackupArgs {
    /// Number of most recent backups to keep
    #[arg(short, long, value_name = "N")]
    pub(crate) keep: Option<usize>,

    /// Backup directory (default: <project>/db_backups)
    #[arg(short, long, value_name = "PATH")]
    pub(crate) dir: Option<PathBuf>,
}

/// Main CLI commands
#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Dump the database, gzip it and prune old backups
    Backup(BackupArgs),
    /// List compressed backups, newest first
    Backups {
        #[command(flatten)]
        args: BackupArgs,
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Delete backups beyond the retention window
    Prune(BackupArgs),
    /// Build the compose images
    Install,
    /// Build and start the containers in the foreground
    Run,
    /// Rebuild and recreate the containers in the background
    Up,
    /// Stop the running containers
    Stop,
    /// Stop and remove the containers
    Down,
    /// Reset the schema: downgrade to base, then upgrade to head
    Initdb,
    /// Autogenerate a new migration revision
    MigrationCreate {
        /// Revision message
        message: Option<String>,
    },
    /// Upgrade the schema to head
    MigrationApply,
    /// Revert the most recent migration
    MigrationDown,
    /// Create the first admin user inside the API container
    CreateAdmin,
    /// Render the API container image definition
    Image {
        /// Development variant (auto-reload, dev requirements)
        #[arg(long)]
        dev: bool,
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Check the API health endpoint
    Health {
        /// Print the response body as JSON
        #[arg(short, long)]
        json: bool,
    },
}

impl Commands {
    /// Build-automation target for this command, if it is one
    pub(crate) fn target(&self) -> Option<Target> {
        let target = match self {
            Commands::Install => Target::Install,
            Commands::Run => Target::Run,
            Commands::Up => Target::Up,
            Commands::Stop => Target::Stop,
            Commands::Down => Target::Down,
            Commands::Initdb => Target::InitDb,
            Commands::MigrationCreate { message } => Target::MigrationCreate {
                message: message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_MIGRATION_MESSAGE.to_string()),
            },
            Commands::MigrationApply => Target::MigrationApply,
            Commands::MigrationDown => Target::MigrationDown,
            Commands::CreateAdmin => Target::CreateAdmin,
            Commands::Backup(_)
            | Commands::Backups { .. }
            | Commands::Prune(_)
            | Commands::Image { .. }
            | Commands::Health { .. } => return None,
        };
        Some(target)
    }
}
