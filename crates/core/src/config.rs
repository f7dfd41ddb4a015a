//! User configuration: optional TOML file layered under environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::info;

use crate::{error::EditorError, slots};

/// Directory name used under the platform config and data directories.
pub const APP_DIR: &str = "quartet-save-editor";
/// Prefix for environment overrides, e.g. `QUARTET_EDITOR_SAVES_ROOT`.
pub const ENV_PREFIX: &str = "QUARTET_EDITOR";

const DEFAULT_CONFIG: &str = r#"# Quartet save editor configuration.
#
# Saves folder to open on startup. Defaults to
# ~/Documents/Something Classic/Quartet/saves
# saves_root = "/path/to/Quartet/saves"

# Replace the bundled item list with your own JSON file of the form
# { "Weapons": [...], "Armor": [...], "Helms": [...], "Accessories": [...], "Items": [...] }
# item_catalog = "/path/to/items.json"

# Where quartet-save-editor.log is written.
# log_dir = "/path/to/logs"
"#;

/// Settings read at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides the default saves-root.
    pub saves_root: Option<PathBuf>,
    /// Catalog file used instead of the bundled one.
    pub item_catalog: Option<PathBuf>,
    /// Directory holding the log file.
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            saves_root: None,
            item_catalog: None,
            log_dir: default_log_dir(),
        }
    }
}

impl AppConfig {
    /// Load from the default config file and the environment.
    pub fn load() -> Result<Self, EditorError> {
        Self::load_from(&config_path())
    }

    /// Load from `path` (which may be absent) and the environment.
    pub fn load_from(path: &Path) -> Result<Self, EditorError> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;
        let config: AppConfig = settings.try_deserialize()?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Saves-root to open on startup: the override, else the game's default.
    pub fn saves_root(&self) -> Option<PathBuf> {
        self.saves_root.clone().or_else(slots::default_saves_root)
    }
}

/// `<config_dir>/quartet-save-editor/config.toml`.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("logs")
}

/// Write a commented template to the default config location if none exists.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))
}
