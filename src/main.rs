//! Play Warehouse ETL Tool
//!
//! This binary loads a tree of song metadata files and a tree of user
//! activity log files into the SQLite warehouse: song and artist
//! dimensions from the metadata files, then time, user and playback
//! rows from the activity logs.

use anyhow::{bail, Context, Result};
use clap::Parser;
use playvault_etl::config::{AppConfig, CliConfig, FileConfig};
use playvault_etl::{
    load_event_file, load_song_file, run_batch, BatchReport, SqliteWarehouseStore,
    WarehouseStore,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "playvault-etl")]
#[command(about = "Load song metadata and activity logs into the play warehouse")]
struct Args {
    /// Path to the SQLite warehouse database file (created if absent)
    #[arg(value_name = "WAREHOUSE_DB", value_parser = parse_path)]
    warehouse_db: PathBuf,

    /// Root directory of the song metadata files
    #[arg(value_name = "SONG_DATA_DIR", value_parser = parse_path)]
    song_data_dir: PathBuf,

    /// Root directory of the activity log files
    #[arg(value_name = "LOG_DATA_DIR", value_parser = parse_path)]
    log_data_dir: PathBuf,

    /// Optional TOML config file; its values override CLI arguments
    #[arg(long, value_parser = parse_path)]
    config: Option<PathBuf>,

    /// Continue loading remaining files when one file fails
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    continue_on_error: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let file_config = match &args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli = CliConfig {
        warehouse_db: args.warehouse_db,
        song_data_dir: args.song_data_dir,
        log_data_dir: args.log_data_dir,
        continue_on_error: args.continue_on_error,
    };
    let config = AppConfig::resolve(&cli, file_config)?;

    info!("Play Warehouse ETL");
    info!("==================");
    info!("Warehouse database: {}", config.warehouse_db.display());
    info!("Song data: {}", config.song_data_dir.display());
    info!("Log data: {}", config.log_data_dir.display());

    let store = SqliteWarehouseStore::open(&config.warehouse_db)?;

    info!("Loading song metadata files...");
    let song_report = run_batch(
        &store,
        &config.song_data_dir,
        load_song_file,
        config.continue_on_error,
    )?;

    info!("Loading activity log files...");
    let log_report = run_batch(
        &store,
        &config.log_data_dir,
        load_event_file,
        config.continue_on_error,
    )?;

    // Print summary
    info!("");
    info!("Load Summary");
    info!("============");
    info!(
        "Song files loaded: {}/{}",
        song_report.loaded, song_report.total
    );
    info!(
        "Log files loaded: {}/{}",
        log_report.loaded, log_report.total
    );
    info!("Songs inserted: {}", song_report.stats.songs);
    info!("Artists inserted: {}", song_report.stats.artists);
    info!("Time entries inserted: {}", log_report.stats.time_entries);
    info!("Users inserted: {}", log_report.stats.users);
    info!("Song plays inserted: {}", log_report.stats.song_plays);

    let failed = failed_file_count(&song_report, &log_report);
    if failed > 0 {
        warn!("Files failed: {}", failed);
    }

    // Verify counts
    let counts = store.count_rows()?;
    info!("");
    info!("Warehouse contains:");
    info!("  {} songs", counts.songs);
    info!("  {} artists", counts.artists);
    info!("  {} time entries", counts.time_entries);
    info!("  {} users", counts.users);
    info!("  {} song plays", counts.song_plays);

    if failed > 0 {
        bail!("{} files failed to load", failed);
    }

    info!("");
    info!("Load completed successfully!");

    Ok(())
}

fn failed_file_count(song_report: &BatchReport, log_report: &BatchReport) -> usize {
    song_report.failures.len() + log_report.failures.len()
}
