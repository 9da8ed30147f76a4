//! Input validation and staging: turn raw uploads into files on disk the
//! converter can read.
//!
//! Validation is *upfront*: every filename in the batch is checked against
//! the supported set before any file is staged or converted, so one bad
//! upload can never waste conversions on the files before it. Staging
//! prefixes each file with a fresh UUID so two uploads with the same name
//! never collide.

use crate::error::DocmergeError;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// The supported office document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Word-processing (`.docx`)
    Docx,
    /// Presentation (`.pptx`)
    Pptx,
    /// Spreadsheet (`.xlsx`)
    Xlsx,
}

impl DocumentKind {
    /// Classify a filename by its extension, case-insensitively.
    /// `None` means the format is unsupported.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(DocumentKind::Docx),
            "pptx" => Some(DocumentKind::Pptx),
            "xlsx" => Some(DocumentKind::Xlsx),
            _ => None,
        }
    }

    /// The extension without a dot, as recorded in the history log.
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Docx => "docx",
            DocumentKind::Pptx => "pptx",
            DocumentKind::Xlsx => "xlsx",
        }
    }
}

/// One file as received from the caller: name and bytes, nothing on disk yet.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// An upload that passed format validation.
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub filename: String,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

/// A validated upload persisted to the staging directory.
#[derive(Debug, Clone)]
pub struct StagedDocument {
    pub filename: String,
    pub kind: DocumentKind,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Validate every upload in the batch before converting any of them.
///
/// Fails with [`DocmergeError::NoFilesUploaded`] on an empty batch and with
/// [`DocmergeError::UnsupportedFormat`] naming the first offending file.
pub fn validate_batch(
    uploads: Vec<UploadedDocument>,
) -> Result<Vec<ValidatedUpload>, DocmergeError> {
    if uploads.is_empty() {
        return Err(DocmergeError::NoFilesUploaded);
    }
    uploads
        .into_iter()
        .map(|u| match DocumentKind::from_filename(&u.filename) {
            Some(kind) => Ok(ValidatedUpload {
                filename: u.filename,
                kind,
                bytes: u.bytes,
            }),
            None => Err(DocmergeError::UnsupportedFormat {
                filename: u.filename,
            }),
        })
        .collect()
}

/// Persist one validated upload under `<dir>/<uuid>_<original-name>`.
pub async fn stage(
    upload: ValidatedUpload,
    dir: &Path,
) -> Result<StagedDocument, DocmergeError> {
    let staged_name = format!("{}_{}", Uuid::new_v4(), upload.filename);
    let path = dir.join(&staged_name);
    let size_bytes = upload.bytes.len() as u64;

    tokio::fs::write(&path, &upload.bytes)
        .await
        .map_err(|e| DocmergeError::StagingFailed {
            filename: upload.filename.clone(),
            source: e,
        })?;

    debug!(filename = %upload.filename, path = %path.display(), "staged upload");

    Ok(StagedDocument {
        filename: upload.filename,
        kind: upload.kind,
        path,
        size_bytes,
    })
}
