//! Log record extraction
//!
//! Turns one reload log file into a [`LogRecord`] using only the file's
//! path and trailing content. Extraction is deterministic: the same path
//! and content always produce the same record.
//!
//! Filename scheme: `<event>.<YYYYMMDD_HHMMSS>.<ext>.log`, nested at least
//! five path components deep so a portable archival path can be recovered
//! from component index 4 onward.

use std::path::{Component, Path};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{HarvestError, Result};

/// Marker line the engine writes at the end of a successful reload
pub const SUCCESS_MARKER: &str = "Search index creation completed successfully";

/// Status message recorded when a log contains neither marker
pub const NO_MESSAGE: &str = "No message found.";

/// Minimum number of path components a log path must have
const MIN_PATH_COMPONENTS: usize = 5;

/// Outcome classification of one reload log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusCode {
    Ok,
    Error,
}

impl StatusCode {
    /// Store representation
    pub fn as_str(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Error => "Error",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed reload log, ready for persistence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    /// First dot-delimited token of the filename
    pub event: String,

    /// Error text, success marker, or [`NO_MESSAGE`]
    pub status_message: String,

    /// OK unless an `Error:` line was found
    pub status_code: StatusCode,

    /// Reload date from the filename's timestamp token
    pub date: NaiveDate,

    /// Filename without its final extension
    pub document_id: String,

    /// Path components from index 4 onward, `/`-joined
    pub relative_path: String,
}

/// Extract a [`LogRecord`] from one log file.
///
/// Fails with `MalformedPath` when the path is too shallow and
/// `MalformedDate` when the filename's second token has no parseable
/// `YYYYMMDD` prefix. IO errors surface as-is.
pub fn extract(path: &Path) -> Result<LogRecord> {
    let components: Vec<Component<'_>> = path.components().collect();
    if components.len() < MIN_PATH_COMPONENTS {
        return Err(HarvestError::MalformedPath(path.to_path_buf()));
    }

    let file_name = match path.file_name() {
        Some(name) => name.to_string_lossy(),
        None => return Err(HarvestError::MalformedPath(path.to_path_buf())),
    };

    let mut tokens = file_name.split('.');
    let event = tokens.next().unwrap_or_default().to_string();
    let date = parse_date_token(tokens.next().unwrap_or_default())?;

    let document_id = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let relative_path = archival_path(&components);

    let content = std::fs::read_to_string(path)?;
    let (status_code, status_message) = scan_status(&content);

    Ok(LogRecord {
        event,
        status_message,
        status_code,
        date,
        document_id,
        relative_path,
    })
}

/// Parse the first eight characters of the filename's date token
fn parse_date_token(token: &str) -> Result<NaiveDate> {
    let prefix = token.get(..8).ok_or_else(|| HarvestError::MalformedDate {
        token: token.to_string(),
    })?;

    NaiveDate::parse_from_str(prefix, "%Y%m%d").map_err(|_| HarvestError::MalformedDate {
        token: token.to_string(),
    })
}

/// Join path components from index 4 onward with `/`, independent of the
/// platform separator
fn archival_path(components: &[Component<'_>]) -> String {
    components
        .iter()
        .skip(MIN_PATH_COMPONENTS - 1)
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Scan the log content backward for a status line.
///
/// The first `Error:` line found (scanning from the end) wins and stops the
/// scan. A success marker does not stop the scan, so an `Error:` line
/// anywhere earlier in the file still takes precedence over a later marker.
fn scan_status(content: &str) -> (StatusCode, String) {
    let mut success_seen = false;

    for line in content.lines().rev() {
        if let Some(index) = line.find("Error:") {
            return (StatusCode::Error, line[index..].trim().to_string());
        }
        if line.contains(SUCCESS_MARKER) {
            success_seen = true;
        }
    }

    if success_seen {
        (StatusCode::Ok, SUCCESS_MARKER.to_string())
    } else {
        (StatusCode::Ok, NO_MESSAGE.to_string())
    }
}
