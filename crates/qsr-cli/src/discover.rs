//! Filesystem discovery
//!
//! Enumerates the candidate documents and reload log files a run works on.
//! Discovery stays thin: the reload and harvest pipelines consume
//! these lists without caring where they came from.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Find candidate documents: `*.qvf` files directly under `dir`.
///
/// Paths are absolutized so the engine receives full document paths, and
/// sorted for stable run-to-run ordering.
pub fn find_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read apps directory {}", dir.display()))?;

    let mut documents = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, "qvf") {
            documents.push(std::path::absolute(&path)?);
        }
    }

    documents.sort();
    Ok(documents)
}

/// Find reload log files: `*.log` anywhere under `dir`.
pub fn find_logs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut logs = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry =
            entry.with_context(|| format!("Failed to scan logs directory {}", dir.display()))?;
        if entry.file_type().is_file() && has_extension(entry.path(), "log") {
            logs.push(entry.into_path());
        }
    }

    logs.sort();
    Ok(logs)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_find_documents_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("Beta.qvf")).unwrap();
        File::create(dir.path().join("Alpha.qvf")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        File::create(dir.path().join("nested").join("Gamma.qvf")).unwrap();

        let documents = find_documents(dir.path()).unwrap();
        let names: Vec<String> = documents
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        // Non-recursive: the nested document is not picked up.
        assert_eq!(names, ["Alpha.qvf", "Beta.qvf"]);
        assert!(documents.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_find_logs_recurses() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("2024").join("week1");
        std::fs::create_dir_all(&nested).unwrap();
        File::create(dir.path().join("top.log")).unwrap();
        File::create(nested.join("deep.log")).unwrap();
        File::create(nested.join("other.txt")).unwrap();

        let logs = find_logs(dir.path()).unwrap();
        assert_eq!(logs.len(), 2);
    }
}
