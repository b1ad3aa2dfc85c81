use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;

use chrono::Utc;

use crate::backup::{BackupJob, DbParams, list_backups, prune};
use crate::cli::{BackupArgs, Cli, Commands};
use crate::config::Config;
use crate::consts::{DEFAULT_BACKUP_DIR, DEFAULT_RETENTION};
use crate::envfile::EnvFile;
use crate::error::AppError;
use crate::exec::Runner;
use crate::health::{evaluate, fetch};
use crate::image::{ImageSpec, Variant};
use crate::output::{BackupTableOptions, output_backups_json, print_backup_table};
use crate::targets::{Target, TargetEnv};
use crate::utils::Timezone;

pub(crate) struct CommandContext<'a> {
    pub(crate) cli: &'a Cli,
    pub(crate) config: &'a Config,
    pub(crate) runner: &'a dyn Runner,
    pub(crate) timezone: Timezone,
}

impl CommandContext<'_> {
    fn backup_dir(&self, args: &BackupArgs) -> PathBuf {
        if let Some(dir) = &args.dir {
            return dir.clone();
        }
        let dir = self
            .config
            .backup_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR));
        self.cli.project_dir.join(dir)
    }

    fn retention(&self, args: &BackupArgs) -> Result<usize, AppError> {
        let keep = args
            .keep
            .or(self.config.retention)
            .unwrap_or(DEFAULT_RETENTION);
        if keep == 0 {
            return Err(AppError::InvalidRetention { input: keep });
        }
        Ok(keep)
    }

    fn target_env(&self) -> TargetEnv {
        TargetEnv {
            docker: self.cli.docker_bin().to_string(),
            compose_file: self.cli.compose_file_path(),
            api_container: self.cli.api_container().to_string(),
        }
    }
}

fn handle_backup(args: &BackupArgs, ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let env = EnvFile::load(&ctx.cli.env_file_path())?;
    let job = BackupJob {
        docker: ctx.cli.docker_bin().to_string(),
        params: DbParams::from_env(&env)?,
        dir: ctx.backup_dir(args),
        keep: ctx.retention(args)?,
        timezone: ctx.timezone,
    };
    let now = Utc::now();

    if ctx.cli.dry_run {
        println!(
            "{} > {}",
            job.dump_invocation(),
            job.archive_path(now).with_extension("").display()
        );
        println!("gzip -> {}", job.archive_path(now).display());
        for entry in job.planned_prune(now)? {
            println!("would remove {}", entry.path.display());
        }
        return Ok(());
    }

    let report = job.run(ctx.runner, now)?;
    for entry in &report.pruned {
        tracing::info!(file = %entry.name, "removed expired backup");
    }
    println!("Backup saved to {}", report.archive.display());
    Ok(())
}

fn handle_backups(args: &BackupArgs, json: bool, ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let dir = ctx.backup_dir(args);
    let keep = ctx.retention(args)?;
    let entries = list_backups(&dir)?;

    if json {
        println!("{}", output_backups_json(&entries, keep));
        return Ok(());
    }
    if entries.is_empty() {
        println!("No backups found in {}.", dir.display());
        return Ok(());
    }
    print_backup_table(
        &entries,
        BackupTableOptions {
            keep,
            use_color: std::io::stdout().is_terminal(),
            timezone: ctx.timezone,
        },
    );
    Ok(())
}

fn handle_prune(args: &BackupArgs, ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let dir = ctx.backup_dir(args);
    let keep = ctx.retention(args)?;
    let removed = prune(&dir, keep, ctx.cli.dry_run)?;

    let verb = if ctx.cli.dry_run { "Would remove" } else { "Removed" };
    for entry in &removed {
        println!("{verb} {}", entry.path.display());
    }
    if removed.is_empty() {
        println!("Nothing to prune (keeping {keep}).");
    }
    Ok(())
}

fn handle_target(target: &Target, ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let env = ctx.target_env();
    if ctx.cli.dry_run {
        for step in target.steps(&env) {
            println!("{step}");
        }
        return Ok(());
    }
    target.run(&env, ctx.runner)?;
    Ok(())
}

fn handle_image(
    dev: bool,
    output: Option<&PathBuf>,
    ctx: &CommandContext<'_>,
) -> Result<(), AppError> {
    let variant = if dev { Variant::Dev } else { Variant::Prod };
    let text = ImageSpec::from_config(&ctx.config.image).render(variant);
    match output {
        Some(path) => {
            fs::write(path, text)
                .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn handle_health(json: bool, ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let result = fetch(ctx.cli.health_url())?;
    if json {
        println!("{}", result.body.trim());
    }
    let status = evaluate(&result)?;
    if !json {
        println!("API {} (database: {})", status.status, status.database);
    }
    Ok(())
}

pub(crate) fn handle_command(ctx: &CommandContext<'_>) -> Result<(), AppError> {
    if let Some(target) = ctx.cli.command.target() {
        return handle_target(&target, ctx);
    }

    match &ctx.cli.command {
        Commands::Backup(args) => handle_backup(args, ctx),
        Commands::Backups { args, json } => handle_backups(args, *json, ctx),
        Commands::Prune(args) => handle_prune(args, ctx),
        Commands::Image { dev, output } => handle_image(*dev, output.as_ref(), ctx),
        Commands::Health { json } => handle_health(*json, ctx),
        _ => unreachable!("targets are dispatched above"),
    }
}
