//! Artifact location: find the PDF one converter invocation produced.
//!
//! The converter does not report its output filename, but it *is*
//! deterministic: LibreOffice writes `<outdir>/<input-stem>.pdf`. Computing
//! that path up front makes detection exact; inferring it from a
//! before/after directory diff would be unsound under concurrent requests
//! and under converters that emit more than one file.
//!
//! The converter can still exit before its output is visible, so the
//! expected path is polled with a deadline instead of a fixed sleep.

use crate::error::DocmergeError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// The path the converter will deterministically produce for `input`.
pub fn expected_artifact(input: &Path, out_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    let mut name = stem.to_os_string();
    name.push(".pdf");
    out_dir.join(name)
}

/// Wait for the artifact at `expected` to appear, polling every
/// `poll_interval` until `wait` has elapsed.
///
/// `display_name` is the original upload filename, used for error messages.
pub async fn await_artifact(
    expected: &Path,
    display_name: &str,
    wait: Duration,
    poll_interval: Duration,
) -> Result<PathBuf, DocmergeError> {
    let deadline = Instant::now() + wait;
    loop {
        if tokio::fs::try_exists(expected).await.unwrap_or(false) {
            debug!(artifact = %expected.display(), "artifact present");
            return Ok(expected.to_path_buf());
        }
        if Instant::now() >= deadline {
            return Err(DocmergeError::ArtifactNotFound {
                filename: display_name.to_string(),
                expected: expected.to_path_buf(),
            });
        }
        tokio::time::sleep(poll_interval).await;
    }
}
