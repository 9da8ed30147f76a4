//! Request handlers: the upload form with conversion history, and the
//! convert-and-merge endpoint.

use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};

use crate::batch::run_batch;
use crate::history::HistoryRecord;
use crate::pipeline::input::UploadedDocument;
use crate::server::error::ApiError;
use crate::server::AppState;

/// `GET /` — upload form plus conversion history, most recent first.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let records = state.history.read_all().await?;
    Ok(Html(render_index(&records)))
}

/// `POST /convert-merge` — multipart field `files` (one or more).
///
/// On success the merged PDF is returned as an attachment; every failure
/// mode maps to the JSON contract in [`crate::server::error`].
pub async fn convert_merge(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut uploads: Vec<UploadedDocument> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart request: {e}")))?
    {
        if field.name() != Some("files") {
            continue;
        }
        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read '{filename}': {e}")))?;
        uploads.push(UploadedDocument::new(filename, bytes.to_vec()));
    }

    let output = run_batch(uploads, &state.config, &state.history).await?;

    let attachment_name = output
        .merged_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("merged.pdf")
        .to_string();
    let body = read_merged(&output.merged_path).await.map_err(ApiError::from)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{attachment_name}\""),
            ),
        ],
        body,
    )
        .into_response())
}

/// Read the merged PDF back for the response body.
async fn read_merged(path: &std::path::Path) -> Result<Vec<u8>, crate::error::DocmergeError> {
    tokio::fs::read(path).await.map_err(|e| {
        crate::error::DocmergeError::Internal(format!(
            "Failed to read merged file '{}': {e}",
            path.display()
        ))
    })
}

// ── HTML rendering ───────────────────────────────────────────────────────

/// Render the index page: upload form and the history table.
fn render_index(records: &[HistoryRecord]) -> String {
    let history = if records.is_empty() {
        "<p>No conversion logs found yet.</p>".to_string()
    } else {
        let mut table = String::from(
            "<table>\n<tr>\
             <th>Timestamp</th>\
             <th>Filename</th>\
             <th>Type</th>\
             <th>Size (MB)</th>\
             <th>Conversion Time (sec)</th>\
             </tr>\n",
        );
        for row in records {
            table.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&row.timestamp),
                escape_html(&row.filename),
                escape_html(&row.file_type),
                row.size_mb,
                row.duration_secs,
            ));
        }
        table.push_str("</table>");
        table
    };

    format!(
        r#"<html>
<head>
    <title>Convert &amp; Merge Files</title>
    <style>
        body {{ font-family: Arial; margin: 30px; }}
        table {{ border-collapse: collapse; width: 100%; margin-top: 30px; }}
        th, td {{ border: 1px solid #ccc; padding: 8px; text-align: left; }}
        th {{ background-color: #f2f2f2; }}
    </style>
</head>
<body>
    <h2>Upload .docx, .pptx, .xlsx files to convert and merge</h2>
    <form method="POST" action="/convert-merge" enctype="multipart/form-data">
        <input type="file" name="files" multiple required>
        <button type="submit">Convert &amp; Merge</button>
    </form>

    <h2>&#128196; Conversion History</h2>
    {history}
</body>
</html>
"#
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
