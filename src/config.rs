//! Configuration for the convert-and-merge service.
//!
//! Every runtime knob lives in [`ServiceConfig`], built via its
//! [`ServiceConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share the config across the server state, log it, and diff
//! two deployments to understand why they behave differently.
//!
//! The converter executable path is configuration, not logic: the platform
//! switch only picks a *default* — any path can be injected via the builder
//! or the CLI's `DOCMERGE_CONVERTER` environment variable.

use crate::error::DocmergeError;
use std::path::{Path, PathBuf};

/// Platform default for the LibreOffice executable.
#[cfg(windows)]
const DEFAULT_CONVERTER: &str = r"C:\Program Files\LibreOffice\program\soffice.exe";
#[cfg(not(windows))]
const DEFAULT_CONVERTER: &str = "libreoffice";

/// Configuration for the docmerge service and pipeline.
///
/// Built via [`ServiceConfig::builder()`] or [`ServiceConfig::default()`].
///
/// # Example
/// ```rust
/// use docmerge::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .port(9000)
///     .data_dir("/var/lib/docmerge")
///     .convert_timeout_secs(60)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// TCP port the HTTP server binds to. Default: 8000.
    pub port: u16,

    /// Path (or bare command name) of the document converter. Default:
    /// `libreoffice`, or the standard soffice.exe install path on Windows.
    pub converter_cmd: PathBuf,

    /// Directory where uploads are staged. Uploads accumulate; no eviction.
    pub uploads_dir: PathBuf,

    /// Root directory for conversion output. Each batch converts into its
    /// own unique subdirectory, which is what makes concurrent requests
    /// safe without a global lock.
    pub converted_dir: PathBuf,

    /// Directory where merged outputs are written. Outputs accumulate.
    pub merged_dir: PathBuf,

    /// Path of the CSV conversion history log.
    pub history_path: PathBuf,

    /// Maximum seconds one converter invocation may run. Default: 120.
    ///
    /// A hung LibreOffice would otherwise pin the request forever. Expiry
    /// kills the child and fails the batch.
    pub convert_timeout_secs: u64,

    /// Maximum milliseconds to wait for the converted artifact to appear
    /// after the converter exits. Default: 10 000.
    ///
    /// LibreOffice occasionally exits before its output is visible to the
    /// caller; the artifact path is polled up to this deadline rather than
    /// waited on with a fixed sleep.
    pub artifact_wait_ms: u64,

    /// Polling interval while waiting for the artifact. Default: 100 ms.
    pub artifact_poll_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let data = PathBuf::from("data");
        Self {
            port: 8000,
            converter_cmd: PathBuf::from(DEFAULT_CONVERTER),
            uploads_dir: data.join("uploads"),
            converted_dir: data.join("converted"),
            merged_dir: data.join("merged"),
            history_path: data.join("conversion_log.csv"),
            convert_timeout_secs: 120,
            artifact_wait_ms: 10_000,
            artifact_poll_ms: 100,
        }
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }

    /// Create the uploads/converted/merged directories if missing.
    pub async fn ensure_dirs(&self) -> Result<(), DocmergeError> {
        for dir in [&self.uploads_dir, &self.converted_dir, &self.merged_dir] {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                DocmergeError::Internal(format!(
                    "Failed to create directory '{}': {e}",
                    dir.display()
                ))
            })?;
        }
        Ok(())
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn converter_cmd(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.config.converter_cmd = cmd.into();
        self
    }

    /// Set uploads/converted/merged directories and the history log path
    /// relative to one data root.
    pub fn data_dir(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        self.config.uploads_dir = root.join("uploads");
        self.config.converted_dir = root.join("converted");
        self.config.merged_dir = root.join("merged");
        self.config.history_path = root.join("conversion_log.csv");
        self
    }

    pub fn uploads_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.uploads_dir = dir.into();
        self
    }

    pub fn converted_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.converted_dir = dir.into();
        self
    }

    pub fn merged_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.merged_dir = dir.into();
        self
    }

    pub fn history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.history_path = path.into();
        self
    }

    pub fn convert_timeout_secs(mut self, secs: u64) -> Self {
        self.config.convert_timeout_secs = secs.max(1);
        self
    }

    pub fn artifact_wait_ms(mut self, ms: u64) -> Self {
        self.config.artifact_wait_ms = ms;
        self
    }

    pub fn artifact_poll_ms(mut self, ms: u64) -> Self {
        self.config.artifact_poll_ms = ms.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, DocmergeError> {
        let c = &self.config;
        if c.converter_cmd.as_os_str().is_empty() {
            return Err(DocmergeError::InvalidConfig(
                "Converter command must not be empty".into(),
            ));
        }
        if c.artifact_poll_ms > c.artifact_wait_ms && c.artifact_wait_ms > 0 {
            return Err(DocmergeError::InvalidConfig(format!(
                "Artifact poll interval ({}ms) exceeds the wait deadline ({}ms)",
                c.artifact_poll_ms, c.artifact_wait_ms
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_under_data_root() {
        let c = ServiceConfig::default();
        assert_eq!(c.port, 8000);
        assert_eq!(c.uploads_dir, PathBuf::from("data/uploads"));
        assert_eq!(c.history_path, PathBuf::from("data/conversion_log.csv"));
    }

    #[test]
    fn data_dir_rebases_all_paths() {
        let c = ServiceConfig::builder()
            .data_dir("/srv/docmerge")
            .build()
            .unwrap();
        assert_eq!(c.converted_dir, PathBuf::from("/srv/docmerge/converted"));
        assert_eq!(c.merged_dir, PathBuf::from("/srv/docmerge/merged"));
        assert_eq!(
            c.history_path,
            PathBuf::from("/srv/docmerge/conversion_log.csv")
        );
    }

    #[test]
    fn empty_converter_rejected() {
        let res = ServiceConfig::builder().converter_cmd("").build();
        assert!(matches!(res, Err(DocmergeError::InvalidConfig(_))));
    }

    #[test]
    fn poll_interval_must_fit_deadline() {
        let res = ServiceConfig::builder()
            .artifact_wait_ms(50)
            .artifact_poll_ms(100)
            .build();
        assert!(res.is_err());
    }

    #[test]
    fn timeout_clamped_to_one_second() {
        let c = ServiceConfig::builder()
            .convert_timeout_secs(0)
            .build()
            .unwrap();
        assert_eq!(c.convert_timeout_secs, 1);
    }
}
