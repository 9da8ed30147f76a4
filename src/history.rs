//! Append-only conversion history, backed by a flat CSV file.
//!
//! One row is appended per successfully converted file; rows written before
//! a batch fails are kept (the log is never rewritten). The read path
//! returns rows newest-first, which is the order the history page displays.
//!
//! The log file is the only mutable state shared between requests, so all
//! access is serialised behind one async mutex. The `csv` crate is
//! synchronous; the short read/write sections run under `spawn_blocking`.

use crate::error::DocmergeError;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// One row of the conversion history.
///
/// Field names serialise to the fixed CSV header
/// `Timestamp,Filename,Type,Size_MB,ConversionTime_sec`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Local wall-clock time, `YYYY-MM-DD HH:MM:SS`.
    #[serde(rename = "Timestamp")]
    pub timestamp: String,

    /// Original upload filename.
    #[serde(rename = "Filename")]
    pub filename: String,

    /// Extension without the dot: `docx`, `pptx`, or `xlsx`.
    #[serde(rename = "Type")]
    pub file_type: String,

    /// Staged input size in megabytes, rounded to two decimals.
    #[serde(rename = "Size_MB")]
    pub size_mb: f64,

    /// Conversion wall-clock duration in seconds, rounded to two decimals.
    #[serde(rename = "ConversionTime_sec")]
    pub duration_secs: f64,
}

impl HistoryRecord {
    /// Build a record timestamped now.
    pub fn new(
        filename: impl Into<String>,
        file_type: impl Into<String>,
        size_bytes: u64,
        duration: Duration,
    ) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            filename: filename.into(),
            file_type: file_type.into(),
            size_mb: Self::megabytes(size_bytes),
            duration_secs: round2(duration.as_secs_f64()),
        }
    }

    /// Bytes → megabytes (1 MB = 1 048 576 bytes), rounded to two decimals.
    pub fn megabytes(bytes: u64) -> f64 {
        round2(bytes as f64 / 1_048_576.0)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// The CSV-backed history log.
pub struct HistoryLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the log file with its header row if it does not exist yet.
    pub async fn ensure_exists(&self) -> Result<(), DocmergeError> {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || ensure_exists_sync(&path))
            .await
            .map_err(|e| DocmergeError::Internal(format!("history task panicked: {e}")))?
    }

    /// Append one row. Creates the file (with header) on first use.
    pub async fn append(&self, record: HistoryRecord) -> Result<(), DocmergeError> {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        debug!(filename = %record.filename, "appending history row");
        tokio::task::spawn_blocking(move || append_sync(&path, &record))
            .await
            .map_err(|e| DocmergeError::Internal(format!("history task panicked: {e}")))?
    }

    /// All rows, newest first. A missing file reads as an empty history.
    pub async fn read_all(&self) -> Result<Vec<HistoryRecord>, DocmergeError> {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_all_sync(&path))
            .await
            .map_err(|e| DocmergeError::Internal(format!("history task panicked: {e}")))?
    }
}

fn history_err(path: &Path, detail: impl std::fmt::Display) -> DocmergeError {
    DocmergeError::HistoryFailed {
        path: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

fn ensure_exists_sync(path: &Path) -> Result<(), DocmergeError> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| history_err(path, e))?;
        }
    }
    let file = std::fs::File::create(path).map_err(|e| history_err(path, e))?;
    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(["Timestamp", "Filename", "Type", "Size_MB", "ConversionTime_sec"])
        .map_err(|e| history_err(path, e))?;
    wtr.flush().map_err(|e| history_err(path, e))?;
    Ok(())
}

fn append_sync(path: &Path, record: &HistoryRecord) -> Result<(), DocmergeError> {
    ensure_exists_sync(path)?;
    let file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| history_err(path, e))?;
    // Header already on disk; serialise the row only.
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    wtr.serialize(record).map_err(|e| history_err(path, e))?;
    wtr.flush().map_err(|e| history_err(path, e))?;
    Ok(())
}

fn read_all_sync(path: &Path) -> Result<Vec<HistoryRecord>, DocmergeError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut rdr = csv::Reader::from_path(path).map_err(|e| history_err(path, e))?;
    let mut records = rdr
        .deserialize()
        .collect::<Result<Vec<HistoryRecord>, _>>()
        .map_err(|e| history_err(path, e))?;
    records.reverse(); // latest first
    Ok(records)
}
