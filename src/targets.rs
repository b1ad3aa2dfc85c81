//! Build-automation targets
//!
//! Each target is a fixed sequence of docker / docker compose invocations.
//! A failing step stops the sequence; earlier steps are not rolled back, so
//! a failed `initdb` can leave the schema at base.

use std::path::PathBuf;

use crate::error::ExecError;
use crate::exec::{Invocation, Runner, run_sequence};

/// Script run inside the API container to create the first admin user
const CREATE_ADMIN_SCRIPT: &str = "scripts/create_admin_user.py";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    Install,
    Run,
    Up,
    Stop,
    Down,
    InitDb,
    MigrationCreate { message: String },
    MigrationApply,
    MigrationDown,
    CreateAdmin,
}

/// Where the target commands point
#[derive(Debug, Clone)]
pub(crate) struct TargetEnv {
    pub(crate) docker: String,
    pub(crate) compose_file: Option<PathBuf>,
    pub(crate) api_container: String,
}

impl TargetEnv {
    fn compose<'a>(&self, args: impl IntoIterator<Item = &'a str>) -> Invocation {
        let mut inv = Invocation::new(&self.docker).arg("compose");
        if let Some(file) = &self.compose_file {
            inv = inv.arg("-f").arg(file.display().to_string());
        }
        inv.args(args)
    }

    fn exec_api<'a>(&self, args: impl IntoIterator<Item = &'a str>) -> Invocation {
        Invocation::new(&self.docker)
            .arg("exec")
            .arg(&self.api_container)
            .args(args)
    }

    fn alembic<'a>(&self, args: impl IntoIterator<Item = &'a str>) -> Invocation {
        self.exec_api(["alembic"]).args(args)
    }
}

impl Target {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Target::Install => "install",
            Target::Run => "run",
            Target::Up => "up",
            Target::Stop => "stop",
            Target::Down => "down",
            Target::InitDb => "initdb",
            Target::MigrationCreate { .. } => "migration-create",
            Target::MigrationApply => "migration-apply",
            Target::MigrationDown => "migration-down",
            Target::CreateAdmin => "create-admin",
        }
    }

    pub(crate) fn steps(&self, env: &TargetEnv) -> Vec<Invocation> {
        match self {
            Target::Install => vec![env.compose(["build"])],
            Target::Run => vec![env.compose(["up", "--build"])],
            Target::Up => vec![env.compose(["up", "-d", "--build", "--force-recreate"])],
            Target::Stop => vec![env.compose(["stop"])],
            Target::Down => vec![env.compose(["down"])],
            Target::InitDb => vec![
                env.alembic(["downgrade", "base"]),
                env.alembic(["upgrade", "head"]),
            ],
            Target::MigrationCreate { message } => vec![
                env.alembic(["revision", "--autogenerate", "-m"])
                    .arg(message.as_str()),
            ],
            Target::MigrationApply => vec![env.alembic(["upgrade", "head"])],
            Target::MigrationDown => vec![env.alembic(["downgrade", "-1"])],
            Target::CreateAdmin => vec![env.exec_api(["python", CREATE_ADMIN_SCRIPT])],
        }
    }

    pub(crate) fn run(&self, env: &TargetEnv, runner: &dyn Runner) -> Result<(), ExecError> {
        tracing::info!(target_name = self.name(), "running target");
        run_sequence(runner, &self.steps(env))
    }
}
