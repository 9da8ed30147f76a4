//! # docmerge
//!
//! Convert office documents (`.docx`, `.pptx`, `.xlsx`) to PDF with an
//! external converter (LibreOffice in headless mode) and merge the results,
//! in upload order, into one PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! uploads
//!  │
//!  ├─ 1. Validate  every extension checked before any work starts
//!  ├─ 2. Stage     bytes persisted under a collision-free name
//!  ├─ 3. Convert   external converter, bounded wait (tokio::process)
//!  ├─ 4. Detect    poll the deterministic artifact path
//!  ├─ 5. Log       one CSV history row per converted file
//!  └─ 6. Merge     lopdf concatenation, input order preserved
//! ```
//!
//! Files are converted strictly sequentially within a batch; any failure
//! aborts the batch with no merged output. Each batch converts into its own
//! output directory, so concurrent batches never interfere.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docmerge::{run_batch, HistoryLog, ServiceConfig, UploadedDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::default();
//!     let history = HistoryLog::new(&config.history_path);
//!     let uploads = vec![
//!         UploadedDocument::new("a.docx", std::fs::read("a.docx")?),
//!         UploadedDocument::new("b.xlsx", std::fs::read("b.xlsx")?),
//!     ];
//!     let output = run_batch(uploads, &config, &history).await?;
//!     println!("merged into {}", output.merged_path.display());
//!     Ok(())
//! }
//! ```
//!
//! Or run the whole service: `docmerge serve` exposes `GET /` (history
//! page) and `POST /convert-merge` (multipart upload → PDF attachment).
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docmerge` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod history;
pub mod output;
pub mod pipeline;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::run_batch;
pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::DocmergeError;
pub use history::{HistoryLog, HistoryRecord};
pub use output::{BatchOutput, BatchStats};
pub use pipeline::input::{DocumentKind, UploadedDocument};
pub use server::{serve, AppState};
