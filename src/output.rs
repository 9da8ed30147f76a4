//! Output types returned by a completed batch.

use crate::history::HistoryRecord;
use std::path::PathBuf;

/// The result of one successful convert-and-merge batch.
#[derive(Debug)]
pub struct BatchOutput {
    /// Path of the merged PDF. The file is kept on disk; it is never
    /// cleaned up by the service.
    pub merged_path: PathBuf,

    /// One history record per converted input, in input order. Mirrors the
    /// rows appended to the history log during the batch.
    pub records: Vec<HistoryRecord>,

    /// Timing breakdown.
    pub stats: BatchStats,
}

/// Timing statistics for one batch.
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    /// Number of files converted (equals the number of uploads on success).
    pub converted_files: usize,
    /// Wall-clock time spent inside converter invocations.
    pub convert_duration_ms: u64,
    /// Wall-clock time spent concatenating artifacts.
    pub merge_duration_ms: u64,
    /// End-to-end batch duration.
    pub total_duration_ms: u64,
}
