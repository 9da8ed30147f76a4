//! CLI binary for docmerge.
//!
//! A thin shim over the library crate: `serve` runs the HTTP service,
//! `convert` runs the batch pipeline on local files without a server.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use docmerge::{run_batch, HistoryLog, ServiceConfig, UploadedDocument};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "docmerge",
    version,
    about = "Convert office documents to PDF and merge them into one file"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service.
    Serve {
        /// Port to listen on.
        #[arg(long, env = "PORT", default_value_t = 8000)]
        port: u16,

        /// Converter executable (LibreOffice).
        #[arg(long, env = "DOCMERGE_CONVERTER")]
        converter: Option<PathBuf>,

        /// Root directory for uploads, artifacts, merged output, and the log.
        #[arg(long, env = "DOCMERGE_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,
    },

    /// Convert and merge local files, no server involved.
    Convert {
        /// Input documents (.docx, .pptx, .xlsx), merged in argument order.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Where to copy the merged PDF.
        #[arg(short, long, default_value = "merged.pdf")]
        output: PathBuf,

        /// Converter executable (LibreOffice).
        #[arg(long, env = "DOCMERGE_CONVERTER")]
        converter: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Serve {
            port,
            converter,
            data_dir,
        } => {
            let mut builder = ServiceConfig::builder().port(port).data_dir(&data_dir);
            if let Some(converter) = converter {
                builder = builder.converter_cmd(converter);
            }
            let config = builder.build()?;
            docmerge::serve(config).await?;
            Ok(())
        }

        Command::Convert {
            files,
            output,
            converter,
        } => {
            let work_dir = tempfile::tempdir().context("failed to create work directory")?;
            let mut builder = ServiceConfig::builder().data_dir(work_dir.path());
            if let Some(converter) = converter {
                builder = builder.converter_cmd(converter);
            }
            let config = builder.build()?;
            let history = HistoryLog::new(&config.history_path);

            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    bail!("not a file path: {}", path.display());
                };
                let bytes = std::fs::read(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                uploads.push(UploadedDocument::new(name, bytes));
            }

            let result = run_batch(uploads, &config, &history).await?;
            std::fs::copy(&result.merged_path, &output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!(
                "merged {} file(s) into {} ({} ms)",
                result.stats.converted_files,
                output.display(),
                result.stats.total_duration_ms
            );
            Ok(())
        }
    }
}
