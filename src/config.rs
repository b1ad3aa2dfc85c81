use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "vegops.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ImageConfig {
    #[serde(default)]
    pub(crate) base_image: Option<String>,
    #[serde(default)]
    pub(crate) port: Option<u16>,
    #[serde(default)]
    pub(crate) app_module: Option<String>,
    #[serde(default)]
    pub(crate) workdir: Option<String>,
    #[serde(default)]
    pub(crate) dev_requirements: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) backup_dir: Option<PathBuf>,
    #[serde(default)]
    pub(crate) retention: Option<usize>,
    #[serde(default)]
    pub(crate) env_file: Option<PathBuf>,
    #[serde(default)]
    pub(crate) api_container: Option<String>,
    #[serde(default)]
    pub(crate) compose_file: Option<PathBuf>,
    #[serde(default)]
    pub(crate) docker_bin: Option<String>,
    #[serde(default)]
    pub(crate) timezone: Option<String>,
    #[serde(default)]
    pub(crate) health_url: Option<String>,
    #[serde(default)]
    pub(crate) image: ImageConfig,
}

impl Config {
    pub(crate) fn load(project_dir: &Path) -> Self {
        // Try config locations in order of priority
        for path in Self::get_config_paths(project_dir) {
            if path.exists()
                && let Ok(content) = fs::read_to_string(&path)
            {
                match toml::from_str::<Config>(&content) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    }
                }
            }
        }

        Self::default()
    }

    fn get_config_paths(project_dir: &Path) -> Vec<PathBuf> {
        // 1. Project-local: ./vegops.toml
        let mut paths = vec![project_dir.join(CONFIG_FILE_NAME)];

        // 2. XDG config: ~/.config/vegops/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("vegops").join("config.toml"));
        }

        // 3. Platform config dir (macOS Application Support)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("vegops").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 4. Home directory: ~/.vegops.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".vegops.toml"));
        }

        paths
    }
}
