//! CLI argument definitions
//!
//! Global CLI options and configuration merging logic.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::consts::{DEFAULT_API_CONTAINER, DEFAULT_ENV_FILE, DEFAULT_HEALTH_URL};

use super::commands::Commands;

/// Environment variable overriding the docker binary
pub(crate) const DOCKER_BIN_ENV: &str = "VEGOPS_DOCKER";

#[derive(Debug, Parser)]
#[command(name = "vegops")]
#[command(about = "Operations CLI for the 321Vegan API", version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// Project root holding .env, docker-compose.yml and db_backups/
    #[arg(short = 'C', long, global = true, value_name = "PATH", default_value = ".")]
    pub(crate) project_dir: PathBuf,

    /// Environment file, relative to the project root (default: .env)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub(crate) env_file: Option<PathBuf>,

    /// Compose file passed to `docker compose -f`
    #[arg(short = 'f', long, global = true, value_name = "PATH")]
    pub(crate) compose_file: Option<PathBuf>,

    /// Name of the API container used for migrations and admin bootstrap
    #[arg(long, global = true, value_name = "NAME")]
    pub(crate) api_container: Option<String>,

    /// Docker binary (default: $VEGOPS_DOCKER or "docker")
    #[arg(long, global = true, value_name = "BIN")]
    pub(crate) docker: Option<String>,

    /// Timezone for backup names and listings (e.g., "Europe/Paris", "UTC")
    #[arg(long, global = true, value_name = "TZ")]
    pub(crate) timezone: Option<String>,

    /// Health endpoint URL
    #[arg(long, global = true, value_name = "URL")]
    pub(crate) health_url: Option<String>,

    /// Print commands instead of running them
    #[arg(short = 'n', long, global = true)]
    pub(crate) dry_run: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub(crate) debug: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "debug")]
    pub(crate) quiet: bool,
}

impl Cli {
    /// Merge config file values into CLI (CLI args take precedence)
    pub(crate) fn with_config(mut self, config: &Config) -> Self {
        if self.env_file.is_none() {
            self.env_file = config.env_file.clone();
        }
        if self.compose_file.is_none() {
            self.compose_file = config.compose_file.clone();
        }
        if self.api_container.is_none() {
            self.api_container = config.api_container.clone();
        }
        if self.docker.is_none() {
            self.docker = std::env::var(DOCKER_BIN_ENV)
                .ok()
                .filter(|v| !v.is_empty())
                .or_else(|| config.docker_bin.clone());
        }
        if self.timezone.is_none() {
            self.timezone = config.timezone.clone();
        }
        if self.health_url.is_none() {
            self.health_url = config.health_url.clone();
        }
        self
    }

    pub(crate) fn env_file_path(&self) -> PathBuf {
        let file = self
            .env_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE));
        self.project_dir.join(file)
    }

    pub(crate) fn compose_file_path(&self) -> Option<PathBuf> {
        self.compose_file.as_ref().map(|f| self.project_dir.join(f))
    }

    pub(crate) fn docker_bin(&self) -> &str {
        self.docker.as_deref().unwrap_or("docker")
    }

    pub(crate) fn api_container(&self) -> &str {
        self.api_container.as_deref().unwrap_or(DEFAULT_API_CONTAINER)
    }

    pub(crate) fn health_url(&self) -> &str {
        self.health_url.as_deref().unwrap_or(DEFAULT_HEALTH_URL)
    }

    /// Default tracing filter derived from --debug/--quiet
    pub(crate) fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}
