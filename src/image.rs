//! Container image definitions for the API
//!
//! Both variants install Poetry, resolve the project dependencies and launch
//! uvicorn on all interfaces. The dev variant adds `--reload` and an extra
//! requirements install.

use std::fmt::Write as _;

use crate::config::ImageConfig;
use crate::consts::APP_PORT;

const DEFAULT_BASE_IMAGE: &str = "python:3.11-slim";
const DEFAULT_APP_MODULE: &str = "app.main:app";
const DEFAULT_WORKDIR: &str = "/app";
const DEFAULT_DEV_REQUIREMENTS: &str = "requirements-dev.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Variant {
    Prod,
    Dev,
}

#[derive(Debug, Clone)]
pub(crate) struct ImageSpec {
    pub(crate) base_image: String,
    pub(crate) workdir: String,
    pub(crate) port: u16,
    pub(crate) app_module: String,
    pub(crate) dev_requirements: String,
}

impl Default for ImageSpec {
    fn default() -> Self {
        Self {
            base_image: DEFAULT_BASE_IMAGE.to_string(),
            workdir: DEFAULT_WORKDIR.to_string(),
            port: APP_PORT,
            app_module: DEFAULT_APP_MODULE.to_string(),
            dev_requirements: DEFAULT_DEV_REQUIREMENTS.to_string(),
        }
    }
}

impl ImageSpec {
    pub(crate) fn from_config(config: &ImageConfig) -> Self {
        let defaults = Self::default();
        Self {
            base_image: config.base_image.clone().unwrap_or(defaults.base_image),
            workdir: config.workdir.clone().unwrap_or(defaults.workdir),
            port: config.port.unwrap_or(defaults.port),
            app_module: config.app_module.clone().unwrap_or(defaults.app_module),
            dev_requirements: config
                .dev_requirements
                .clone()
                .unwrap_or(defaults.dev_requirements),
        }
    }

    fn launch_command(&self, variant: Variant) -> String {
        let port = self.port.to_string();
        let mut args = vec![
            "uvicorn",
            self.app_module.as_str(),
            "--host",
            "0.0.0.0",
            "--port",
            port.as_str(),
        ];
        if variant == Variant::Dev {
            args.push("--reload");
        }
        let quoted: Vec<String> = args.iter().map(|a| format!("\"{a}\"")).collect();
        format!("CMD [{}]", quoted.join(", "))
    }

    pub(crate) fn render(&self, variant: Variant) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = writeln!(out, "FROM {}", self.base_image);
        let _ = writeln!(out);
        let _ = writeln!(out, "ENV PYTHONDONTWRITEBYTECODE=1 \\");
        let _ = writeln!(out, "    PYTHONUNBUFFERED=1");
        let _ = writeln!(out);
        let _ = writeln!(out, "WORKDIR {}", self.workdir);
        let _ = writeln!(out);
        let _ = writeln!(out, "RUN pip install --no-cache-dir poetry \\");
        let _ = writeln!(out, "    && poetry config virtualenvs.create false");
        let _ = writeln!(out);
        let _ = writeln!(out, "COPY pyproject.toml poetry.lock* ./");
        let _ = writeln!(out, "RUN poetry install --no-interaction --no-ansi --no-root");
        let _ = writeln!(out);
        if variant == Variant::Dev {
            let _ = writeln!(out, "COPY {} ./", self.dev_requirements);
            let _ = writeln!(out, "RUN pip install --no-cache-dir -r {}", self.dev_requirements);
            let _ = writeln!(out);
        }
        let _ = writeln!(out, "COPY . .");
        let _ = writeln!(out);
        let _ = writeln!(out, "EXPOSE {}", self.port);
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.launch_command(variant));
        out
    }
}
