//! Dedup filter
//!
//! Pure set difference between candidate log files and the document ids
//! already present in the store. Operates on a snapshot fetched beforehand;
//! no I/O happens here.

use std::collections::HashSet;
use std::path::PathBuf;

/// Keep only the candidates whose file stem (document id) is not yet in the
/// store. Candidates without a recoverable stem pass through as new.
pub fn filter_new(candidates: Vec<PathBuf>, existing_ids: &HashSet<String>) -> Vec<PathBuf> {
    candidates
        .into_iter()
        .filter(|path| {
            path.file_stem()
                .map(|stem| !existing_ids.contains(stem.to_string_lossy().as_ref()))
                .unwrap_or(true)
        })
        .collect()
}
