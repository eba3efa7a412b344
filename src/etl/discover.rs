use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively collect every `*.json` file under `root` as an absolute
/// path. The extension match is case-sensitive.
///
/// The list is materialized (the driver wants a total count up front)
/// and sorted for reproducible processing order. A missing or
/// unreadable root propagates as an error.
pub fn discover_json_files(root: &Path) -> Result<Vec<PathBuf>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Error resolving data directory: {}", root.display()))?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&root) {
        let entry =
            entry.with_context(|| format!("Failed to walk data directory: {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().is_some_and(|ext| ext == "json") {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
