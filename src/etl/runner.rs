use super::discover::discover_json_files;
use super::LoadStats;
use crate::warehouse::WarehouseStore;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// A per-file loader: parses one discovered file and issues its inserts
/// through the store.
pub type FileLoader = fn(&dyn WarehouseStore, &Path) -> Result<LoadStats>;

/// A file the batch failed to load, with its rendered error chain.
#[derive(Clone, Debug)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of one batch over a data directory.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files discovered under the root.
    pub total: usize,
    /// Files loaded and committed.
    pub loaded: usize,
    /// Rows inserted across all committed files.
    pub stats: LoadStats,
    /// Files rolled back.
    pub failures: Vec<FailedFile>,
}

/// Discover every JSON file under `root` and apply `loader` to each, in
/// discovery order, committing after each file.
///
/// Each file runs inside its own transaction: on failure the file is
/// rolled back while everything committed before it stays. With
/// `continue_on_error` the failure is recorded and the batch moves on;
/// otherwise the error propagates and the remaining files are skipped.
pub fn run_batch(
    store: &dyn WarehouseStore,
    root: &Path,
    loader: FileLoader,
    continue_on_error: bool,
) -> Result<BatchReport> {
    let files = discover_json_files(root)?;
    let total = files.len();
    info!("{} files found in {}", total, root.display());

    let mut report = BatchReport {
        total,
        ..BatchReport::default()
    };
    for (index, file) in files.iter().enumerate() {
        store.begin_file()?;
        match loader(store, file) {
            Ok(stats) => {
                store.commit_file()?;
                report.loaded += 1;
                report.stats.merge(&stats);
                info!("{}/{} files processed.", index + 1, total);
            }
            Err(e) => {
                store.rollback_file()?;
                if !continue_on_error {
                    return Err(e);
                }
                error!("Failed to load {}: {:#}", file.display(), e);
                report.failures.push(FailedFile {
                    path: file.clone(),
                    error: format!("{:#}", e),
                });
            }
        }
    }
    Ok(report)
}
