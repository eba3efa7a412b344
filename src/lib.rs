//! Play Warehouse ETL Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod etl;
pub mod records;
pub mod warehouse;

// Re-export commonly used types for convenience
pub use etl::{
    discover_json_files, load_event_file, load_song_file, run_batch, BatchReport, LoadStats,
};
pub use warehouse::{RowCounts, SqliteWarehouseStore, WarehouseStore};
