use std::path::{Path, PathBuf};

use thiserror::Error;

mod schema;

pub use schema::{ANY_ORIGIN, Config, CorsConfig, DEFAULT_HOST, DEFAULT_PORT, parse_port};

pub const ASSET_DIR_ENV: &str = "TASKS_ASSET_DIR";
const CONFIG_FILE_NAME: &str = "config.json";
const DATABASE_FILE_NAME: &str = "tasks.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Directory holding the config file and the default database.
pub fn asset_dir() -> PathBuf {
    asset_dir_with(|key| std::env::var(key).ok())
}

pub fn asset_dir_with<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(ASSET_DIR_ENV).filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir.trim());
    }

    directories::ProjectDirs::from("dev", "taskmanager", "task-manager")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

pub fn config_path(asset_dir: &Path) -> PathBuf {
    asset_dir.join(CONFIG_FILE_NAME)
}

/// `sqlite://<asset_dir>/tasks.db?mode=rwc`, created on first connect.
pub fn default_database_url(asset_dir: &Path) -> String {
    format!(
        "sqlite://{}?mode=rwc",
        asset_dir.join(DATABASE_FILE_NAME).to_string_lossy()
    )
}

impl Config {
    pub fn database_url_or_default(&self, asset_dir: &Path) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| default_database_url(asset_dir))
    }
}

/// Will always return config, falling back to defaults on missing/invalid files.
pub fn load_config_from_file(config_path: &Path) -> Config {
    match std::fs::read_to_string(config_path) {
        Ok(raw_config) => Config::from_raw(&raw_config),
        Err(err) => {
            if err.kind() == std::io::ErrorKind::NotFound {
                tracing::info!("No config file found at {}", config_path.display());
            } else {
                tracing::warn!("Failed to read config file: {}", err);
            }
            Config::default()
        }
    }
}

pub fn save_config_to_file(config: &Config, config_path: &Path) -> Result<(), ConfigError> {
    let normalized = config.clone().normalized();
    let raw_config = serde_json::to_string_pretty(&normalized)?;
    std::fs::write(config_path, raw_config)?;
    Ok(())
}

/// File values first, then process environment overrides. A default file is
/// written when none exists so the knobs are discoverable.
pub fn load_runtime_config(asset_dir: &Path) -> Config {
    let path = config_path(asset_dir);
    let mut config = load_config_from_file(&path);

    if !path.exists() {
        if let Err(err) = save_config_to_file(&config, &path) {
            tracing::warn!("Failed to write default config file: {}", err);
        }
    }

    config.apply_env_overrides(|key| std::env::var(key).ok());
    config
}
