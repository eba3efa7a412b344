mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub warehouse_db: PathBuf,
    pub song_data_dir: PathBuf,
    pub log_data_dir: PathBuf,
    pub continue_on_error: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub warehouse_db: PathBuf,
    pub song_data_dir: PathBuf,
    pub log_data_dir: PathBuf,
    pub continue_on_error: bool,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let warehouse_db = file
            .warehouse_db
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.warehouse_db.clone());

        let song_data_dir = file
            .song_data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.song_data_dir.clone());

        let log_data_dir = file
            .log_data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.log_data_dir.clone());

        // Validate data roots up front so a typo fails before any work
        if !song_data_dir.is_dir() {
            bail!("Song data directory does not exist: {:?}", song_data_dir);
        }
        if !log_data_dir.is_dir() {
            bail!("Log data directory does not exist: {:?}", log_data_dir);
        }

        let continue_on_error = file.continue_on_error.unwrap_or(cli.continue_on_error);

        Ok(Self {
            warehouse_db,
            song_data_dir,
            log_data_dir,
            continue_on_error,
        })
    }
}
