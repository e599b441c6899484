use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::consts::APP_DIR;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Config {
    /// Claude home directory (the one containing `projects/`)
    #[serde(default)]
    pub(crate) log_dir: Option<PathBuf>,
    /// Refresh interval in seconds
    #[serde(default)]
    pub(crate) refresh: Option<f64>,
    #[serde(default)]
    pub(crate) no_watch: bool,
    #[serde(default)]
    pub(crate) offline: bool,
    #[serde(default)]
    pub(crate) sort: Option<String>,
    #[serde(default)]
    pub(crate) no_color: bool,
    #[serde(default)]
    pub(crate) debug: bool,

    /// Where this config was read from
    #[serde(skip)]
    pub(crate) loaded_from: Option<PathBuf>,
    /// Config files that exist but could not be used. Reported once logging is up.
    #[serde(skip)]
    pub(crate) problems: Vec<String>,
}

impl Config {
    /// First readable, parseable config in priority order, else defaults.
    pub(crate) fn load() -> Self {
        Self::load_from(&Self::get_config_paths())
    }

    fn load_from(paths: &[PathBuf]) -> Self {
        let mut problems = Vec::new();

        for path in paths {
            if !path.exists() {
                continue;
            }
            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    problems.push(format!("Failed to read {}: {}", path.display(), e));
                    continue;
                }
            };
            match toml::from_str::<Config>(&content) {
                Ok(mut config) => {
                    config.loaded_from = Some(path.clone());
                    config.problems = problems;
                    return config;
                }
                Err(e) => problems.push(format!("Failed to parse {}: {}", path.display(), e)),
            }
        }

        Self {
            problems,
            ..Self::default()
        }
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/cctop/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join(APP_DIR).join("config.toml"));
        }

        // 2. Platform config dir (e.g. ~/Library/Application Support/cctop/config.toml)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join(APP_DIR).join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.cctop.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(format!(".{APP_DIR}.toml")));
        }

        paths
    }
}
