//! End-to-end tests for the convert-and-merge pipeline.
//!
//! The external converter is replaced by a small shell script that mimics
//! LibreOffice's contract: it is invoked as
//! `<cmd> --headless --convert-to pdf --outdir <dir> <input>` and writes
//! `<dir>/<input-stem>.pdf`. Each uploaded "document" carries the path of a
//! pre-generated one-page PDF as its content, and the script copies that
//! PDF into place — so the merged output proves which input produced which
//! page, in which order.
//!
//! Unix only: the fake converter is a shell script.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};

use docmerge::{run_batch, DocmergeError, HistoryLog, ServiceConfig, UploadedDocument};

// ── Fixtures ─────────────────────────────────────────────────────────────

/// Build a minimal valid one-page PDF showing `text`.
fn one_page_pdf(text: &str) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));
    let resources_id = doc.add_object(Dictionary::from_iter([(
        "Font",
        Object::Dictionary(Dictionary::from_iter([("F1", Object::Reference(font_id))])),
    )]));

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![100.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

    let page_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        ("Contents", Object::Reference(content_id)),
        ("Resources", Object::Reference(resources_id)),
        (
            "MediaBox",
            Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
        ),
    ]));

    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(vec![Object::Reference(page_id)])),
            ("Count", Object::Integer(1)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}

fn save_fixture_pdf(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    one_page_pdf(text).save_to(&mut file).unwrap();
    path
}

/// Write the fake converter script and make it executable.
///
/// The script reads the fixture-PDF path out of the input file's content
/// and copies that PDF to the deterministic artifact path.
fn fake_converter(dir: &Path) -> PathBuf {
    let script = dir.join("fake-soffice.sh");
    std::fs::write(
        &script,
        "#!/bin/sh\n\
         # $1=--headless $2=--convert-to $3=pdf $4=--outdir $5=OUTDIR $6=INPUT\n\
         out_dir=\"$5\"\n\
         input=\"$6\"\n\
         stem=$(basename \"$input\")\n\
         stem=\"${stem%.*}\"\n\
         cp \"$(cat \"$input\")\" \"$out_dir/$stem.pdf\"\n",
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

fn test_config(data_dir: &Path, converter: &Path) -> ServiceConfig {
    ServiceConfig::builder()
        .data_dir(data_dir)
        .converter_cmd(converter)
        .convert_timeout_secs(10)
        .artifact_wait_ms(2_000)
        .artifact_poll_ms(10)
        .build()
        .unwrap()
}

/// An upload whose content points the fake converter at `fixture`.
fn upload_for(name: &str, fixture: &Path) -> UploadedDocument {
    UploadedDocument::new(name, fixture.to_str().unwrap().as_bytes().to_vec())
}

// ── Batch pipeline ───────────────────────────────────────────────────────

#[tokio::test]
async fn batch_merges_pages_in_upload_order() {
    let dir = tempfile::tempdir().unwrap();
    let converter = fake_converter(dir.path());
    let config = test_config(&dir.path().join("data"), &converter);
    let history = HistoryLog::new(&config.history_path);

    let first = save_fixture_pdf(dir.path(), "first.pdf", "first");
    let second = save_fixture_pdf(dir.path(), "second.pdf", "second");

    let uploads = vec![upload_for("a.docx", &first), upload_for("b.xlsx", &second)];
    let output = run_batch(uploads, &config, &history).await.unwrap();

    assert!(output.merged_path.starts_with(&config.merged_dir));
    let merged = Document::load(&output.merged_path).unwrap();
    assert_eq!(merged.get_pages().len(), 2);
    assert_eq!(merged.extract_text(&[1]).unwrap().trim(), "first");
    assert_eq!(merged.extract_text(&[2]).unwrap().trim(), "second");
}

#[tokio::test]
async fn batch_appends_one_history_row_per_file() {
    let dir = tempfile::tempdir().unwrap();
    let converter = fake_converter(dir.path());
    let config = test_config(&dir.path().join("data"), &converter);
    let history = HistoryLog::new(&config.history_path);

    let first = save_fixture_pdf(dir.path(), "first.pdf", "first");
    let second = save_fixture_pdf(dir.path(), "second.pdf", "second");
    // The "document" bytes are the fixture path, so that is the staged size.
    let first_len = first.to_str().unwrap().len() as u64;

    let uploads = vec![upload_for("a.docx", &first), upload_for("b.xlsx", &second)];
    let output = run_batch(uploads, &config, &history).await.unwrap();

    assert_eq!(output.records.len(), 2);
    assert_eq!(output.records[0].filename, "a.docx");
    assert_eq!(output.records[0].file_type, "docx");
    assert_eq!(output.records[1].filename, "b.xlsx");
    assert_eq!(output.records[1].file_type, "xlsx");
    // Size_MB is derived from the staged input's byte size.
    let expected_mb = docmerge::HistoryRecord::megabytes(first_len);
    assert_eq!(output.records[0].size_mb, expected_mb);

    // On disk: insertion order a, b; read back newest-first: b, a.
    let rows = history.read_all().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].filename, "b.xlsx");
    assert_eq!(rows[1].filename, "a.docx");
}

#[tokio::test]
async fn converter_failure_aborts_batch_after_partial_progress() {
    let dir = tempfile::tempdir().unwrap();
    // Converter that succeeds for inputs containing a readable fixture path
    // and fails (exit 1) when the fixture is missing.
    let converter = fake_converter(dir.path());
    let config = test_config(&dir.path().join("data"), &converter);
    let history = HistoryLog::new(&config.history_path);

    let first = save_fixture_pdf(dir.path(), "first.pdf", "first");
    let missing = dir.path().join("does-not-exist.pdf");

    let uploads = vec![upload_for("a.docx", &first), upload_for("d.pptx", &missing)];
    let err = run_batch(uploads, &config, &history).await.unwrap_err();
    match err {
        DocmergeError::ConversionFailed { filename, .. } => assert_eq!(filename, "d.pptx"),
        other => panic!("expected ConversionFailed, got {other:?}"),
    }

    // No merged output, but the first file's history row stays (append-only).
    let merged: Vec<_> = std::fs::read_dir(&config.merged_dir)
        .map(|d| d.flatten().collect())
        .unwrap_or_default();
    assert!(merged.is_empty());
    let rows = history.read_all().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].filename, "a.docx");
}

// ── HTTP surface ─────────────────────────────────────────────────────────

mod http {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use docmerge::server::{router, AppState};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn multipart_request(parts: &[(&str, &[u8])]) -> Request<Body> {
        let boundary = "docmerge-e2e-boundary";
        let mut body: Vec<u8> = Vec::new();
        for (filename, content) in parts {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\n\
                     Content-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/convert-merge")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn upload_two_files_returns_pdf_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let converter = fake_converter(dir.path());
        let config = test_config(&dir.path().join("data"), &converter);
        let app = router(AppState::new(config));

        let first = save_fixture_pdf(dir.path(), "first.pdf", "first");
        let second = save_fixture_pdf(dir.path(), "second.pdf", "second");

        let request = multipart_request(&[
            ("a.docx", first.to_str().unwrap().as_bytes()),
            ("b.xlsx", second.to_str().unwrap().as_bytes()),
        ]);
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment"), "got: {disposition}");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..4], b"%PDF");
        let merged = Document::load_mem(&bytes).unwrap();
        assert_eq!(merged.get_pages().len(), 2);
    }

    #[tokio::test]
    async fn unsupported_upload_converts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let converter = fake_converter(dir.path());
        let config = test_config(&dir.path().join("data"), &converter);
        let state = AppState::new(config);
        let history = std::sync::Arc::clone(&state.history);
        let app = router(state);

        let first = save_fixture_pdf(dir.path(), "first.pdf", "first");
        let request = multipart_request(&[
            ("a.docx", first.to_str().unwrap().as_bytes()),
            ("c.txt", b"plain text"),
        ]);
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "c.txt has unsupported format");
        assert!(history.read_all().await.unwrap().is_empty());
    }
}
