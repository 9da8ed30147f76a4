//! Converter invocation: run the external document converter on one input.
//!
//! The converter is an opaque command-line tool (LibreOffice in practice)
//! invoked in headless batch mode. Success is defined purely by its exit
//! status; it reports nothing about the file it produced, which is why
//! [`super::detect`] exists.
//!
//! The wait is bounded: a wedged converter must not pin the request
//! forever. On expiry the child is killed and the batch fails the same way
//! a nonzero exit does.

use crate::error::DocmergeError;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Invoke the converter on `input`, writing the PDF into `out_dir`.
///
/// `display_name` is the original upload filename, used for error messages.
pub async fn convert_document(
    converter: &Path,
    input: &Path,
    out_dir: &Path,
    display_name: &str,
    timeout: Duration,
) -> Result<(), DocmergeError> {
    debug!(
        converter = %converter.display(),
        input = %input.display(),
        out_dir = %out_dir.display(),
        "invoking converter"
    );

    let mut child = Command::new(converter)
        .arg("--headless")
        .arg("--convert-to")
        .arg("pdf")
        .arg("--outdir")
        .arg(out_dir)
        .arg(input)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| DocmergeError::ConversionFailed {
            filename: display_name.to_string(),
            detail: format!("failed to spawn '{}': {e}", converter.display()),
        })?;

    let status = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(res) => res.map_err(|e| DocmergeError::ConversionFailed {
            filename: display_name.to_string(),
            detail: format!("failed to wait on converter: {e}"),
        })?,
        Err(_) => {
            warn!(filename = display_name, "converter timed out, killing");
            let _ = child.start_kill();
            let _ = child.wait().await;
            return Err(DocmergeError::ConversionTimeout {
                filename: display_name.to_string(),
                secs: timeout.as_secs(),
            });
        }
    };

    if !status.success() {
        warn!(filename = display_name, %status, "converter exited nonzero");
        return Err(DocmergeError::ConversionFailed {
            filename: display_name.to_string(),
            detail: format!("converter exited with {status}"),
        });
    }

    Ok(())
}
