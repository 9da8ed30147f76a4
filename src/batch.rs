//! Batch orchestration: the convert-then-merge pipeline.
//!
//! One call to [`run_batch`] handles one request's worth of uploads:
//! validate everything, then for each file in original order stage → convert
//! → locate artifact → log, and finally concatenate all artifacts into one
//! uniquely named PDF. Files are processed strictly sequentially; any
//! failure aborts the batch with no merged output (history rows already
//! appended stay, by design — the log is append-only).
//!
//! Each batch converts into its own subdirectory of the configured output
//! root, so concurrent batches can never observe each other's artifacts.

use crate::config::ServiceConfig;
use crate::error::DocmergeError;
use crate::history::{HistoryLog, HistoryRecord};
use crate::output::{BatchOutput, BatchStats};
use crate::pipeline::{convert, detect, input};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

/// Run one convert-and-merge batch over `uploads`, in upload order.
///
/// # Errors
/// Any [`DocmergeError`] aborts the whole batch: no merged file is written
/// and the error names the offending upload where one exists.
pub async fn run_batch(
    uploads: Vec<input::UploadedDocument>,
    config: &ServiceConfig,
    history: &HistoryLog,
) -> Result<BatchOutput, DocmergeError> {
    let total_start = Instant::now();

    // ── Step 1: Validate every upload before touching any of them ───────
    let validated = input::validate_batch(uploads)?;
    info!(files = validated.len(), "starting batch");

    // ── Step 2: Batch-private output directory ───────────────────────────
    config.ensure_dirs().await?;
    let batch_dir = config.converted_dir.join(Uuid::new_v4().to_string());
    tokio::fs::create_dir_all(&batch_dir).await.map_err(|e| {
        DocmergeError::Internal(format!(
            "Failed to create batch directory '{}': {e}",
            batch_dir.display()
        ))
    })?;

    // ── Step 3: Convert each file, in order ──────────────────────────────
    let convert_timeout = Duration::from_secs(config.convert_timeout_secs);
    let artifact_wait = Duration::from_millis(config.artifact_wait_ms);
    let poll_interval = Duration::from_millis(config.artifact_poll_ms);

    let mut artifacts: Vec<PathBuf> = Vec::with_capacity(validated.len());
    let mut records: Vec<HistoryRecord> = Vec::with_capacity(validated.len());
    let mut convert_duration_ms: u64 = 0;

    for upload in validated {
        let filename = upload.filename.clone();
        let kind = upload.kind;

        let staged = input::stage(upload, &config.uploads_dir).await?;
        let file_start = Instant::now();

        convert::convert_document(
            &config.converter_cmd,
            &staged.path,
            &batch_dir,
            &filename,
            convert_timeout,
        )
        .await?;

        let expected = detect::expected_artifact(&staged.path, &batch_dir);
        let artifact =
            detect::await_artifact(&expected, &filename, artifact_wait, poll_interval).await?;

        let elapsed = file_start.elapsed();
        debug!(
            filename = %filename,
            artifact = %artifact.display(),
            ms = elapsed.as_millis() as u64,
            "converted"
        );

        let record = HistoryRecord::new(&filename, kind.as_str(), staged.size_bytes, elapsed);
        history.append(record.clone()).await?;

        convert_duration_ms += elapsed.as_millis() as u64;
        artifacts.push(artifact);
        records.push(record);
    }

    // ── Step 4: Merge artifacts in input order ───────────────────────────
    let merge_start = Instant::now();
    let merged_path = config
        .merged_dir
        .join(format!("merged_{}.pdf", Uuid::new_v4().simple()));

    let out = merged_path.clone();
    // lopdf is synchronous and CPU-bound; keep it off the async threads.
    tokio::task::spawn_blocking(move || crate::pipeline::merge::merge_to_file(&artifacts, &out))
        .await
        .map_err(|e| DocmergeError::Internal(format!("merge task panicked: {e}")))??;
    let merge_duration_ms = merge_start.elapsed().as_millis() as u64;

    let stats = BatchStats {
        converted_files: records.len(),
        convert_duration_ms,
        merge_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        files = stats.converted_files,
        merged = %merged_path.display(),
        total_ms = stats.total_duration_ms,
        "batch complete"
    );

    Ok(BatchOutput {
        merged_path,
        records,
        stats,
    })
}
