//! Error types for the docmerge library.
//!
//! Every failure in the batch pipeline is fatal to the current batch: the
//! request that triggered it gets an error response and no merged output.
//! Nothing is retried and nothing is rolled back — staged uploads and
//! history rows written before the failing file stay on disk.
//!
//! Variants that name a specific input carry the *original* upload filename
//! (not the staged path), because that is the name the caller knows and the
//! name the HTTP contract puts in error bodies.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the docmerge library.
#[derive(Debug, Error)]
pub enum DocmergeError {
    // ── Request errors ────────────────────────────────────────────────────
    /// The batch contained no files at all.
    #[error("No files uploaded")]
    NoFilesUploaded,

    /// An uploaded file's extension is not in the supported set.
    #[error("{filename} has unsupported format")]
    UnsupportedFormat { filename: String },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// Could not persist the upload to the staging directory.
    #[error("Failed to stage '{filename}': {source}")]
    StagingFailed {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    /// The external converter could not be spawned or exited nonzero.
    #[error("Failed to convert {filename}: {detail}")]
    ConversionFailed { filename: String, detail: String },

    /// The external converter did not finish within the configured timeout.
    /// Treated exactly like a conversion failure by the HTTP surface.
    #[error("Conversion of {filename} timed out after {secs}s")]
    ConversionTimeout { filename: String, secs: u64 },

    /// The converter exited successfully but the expected artifact never
    /// appeared within the polling deadline.
    #[error("Converted PDF for {filename} not found (expected '{}')", expected.display())]
    ArtifactNotFound {
        filename: String,
        expected: PathBuf,
    },

    // ── Merge errors ──────────────────────────────────────────────────────
    /// lopdf failed to load or combine an artifact.
    #[error("Failed to merge PDFs: {detail}")]
    MergeFailed { detail: String },

    /// Could not write the merged output file.
    #[error("Failed to write output file '{}': {source}", path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Log errors ────────────────────────────────────────────────────────
    /// The history log could not be created, appended, or read.
    #[error("History log error at '{}': {detail}", path.display())]
    HistoryFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocmergeError {
    /// The original upload filename this error is about, if any.
    ///
    /// Used by the HTTP layer to build the per-file error bodies.
    pub fn filename(&self) -> Option<&str> {
        match self {
            DocmergeError::UnsupportedFormat { filename }
            | DocmergeError::StagingFailed { filename, .. }
            | DocmergeError::ConversionFailed { filename, .. }
            | DocmergeError::ConversionTimeout { filename, .. }
            | DocmergeError::ArtifactNotFound { filename, .. } => Some(filename),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_display() {
        let e = DocmergeError::UnsupportedFormat {
            filename: "c.txt".into(),
        };
        assert_eq!(e.to_string(), "c.txt has unsupported format");
    }

    #[test]
    fn no_files_display() {
        assert_eq!(
            DocmergeError::NoFilesUploaded.to_string(),
            "No files uploaded"
        );
    }

    #[test]
    fn artifact_not_found_display() {
        let e = DocmergeError::ArtifactNotFound {
            filename: "a.docx".into(),
            expected: PathBuf::from("/tmp/out/a.pdf"),
        };
        let msg = e.to_string();
        assert!(
            msg.starts_with("Converted PDF for a.docx not found"),
            "got: {msg}"
        );
        assert!(msg.contains("/tmp/out/a.pdf"));
    }

    #[test]
    fn conversion_timeout_display() {
        let e = DocmergeError::ConversionTimeout {
            filename: "d.pptx".into(),
            secs: 120,
        };
        assert!(e.to_string().contains("d.pptx"));
        assert!(e.to_string().contains("120s"));
    }

    #[test]
    fn filename_accessor() {
        let e = DocmergeError::ConversionFailed {
            filename: "d.pptx".into(),
            detail: "exit status 1".into(),
        };
        assert_eq!(e.filename(), Some("d.pptx"));
        assert_eq!(DocmergeError::NoFilesUploaded.filename(), None);
    }
}
