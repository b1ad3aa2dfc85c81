mod app;
mod backup;
mod cli;
mod config;
mod consts;
mod envfile;
mod error;
mod exec;
mod health;
mod image;
mod logging;
mod output;
mod targets;
mod utils;

use clap::Parser;

use app::{CommandContext, handle_command};
use cli::Cli;
use config::Config;
use exec::SystemRunner;
use utils::Timezone;

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.log_level());

    let config = Config::load(&cli.project_dir);
    let cli = cli.with_config(&config);

    let timezone = match Timezone::parse(cli.timezone.as_deref()) {
        Ok(tz) => tz,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let runner = SystemRunner;
    let ctx = CommandContext {
        cli: &cli,
        config: &config,
        runner: &runner,
        timezone,
    };

    if let Err(e) = handle_command(&ctx) {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
