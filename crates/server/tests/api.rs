//! In-process tests of the HTTP surface

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use filedock::FiledockConfig;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use server::{build_router, ServerConfig, ServerState};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "filedock-test-boundary";

fn test_app() -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        dock: FiledockConfig::default().with_content_dir(dir.path().join("uploads")),
        ..Default::default()
    };
    let state = ServerState::new(config).unwrap();
    (dir, build_router(Arc::new(state)))
}

/// (field name, filename, content)
fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> String {
    let mut body = String::new();
    for (name, filename, content) in parts {
        body.push_str(&format!("--{BOUNDARY}\r\n"));
        match filename {
            Some(filename) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n"
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"\r\n"
            )),
        }
        body.push_str("\r\n");
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn upload_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn preview_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/preview")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn upload_then_preview_and_retrieve() {
    let (_dir, app) = test_app();

    let (status, body) = send_json(
        &app,
        upload_request(&[("csv", Some("My Data.csv"), "a,b\n1,2\n3,4\n")]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let csv = &body["files"]["csv"];
    assert_eq!(csv["filename"], "My Data.csv");
    assert_eq!(csv["stored_as"], "csv__My_Data.csv");
    assert_eq!(csv["size"], 12);
    assert_eq!(csv["url"], "/files/csv__My_Data.csv");
    assert!(body["files"].get("spec").is_none());

    let (status, preview) = send_json(&app, preview_request(json!({"filename": "csv__My_Data.csv"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        preview,
        json!({
            "storedName": "csv__My_Data.csv",
            "delimiter": ",",
            "headers": ["a", "b"],
            "rows": [["1", "2"], ["3", "4"]],
            "rowCount": 2
        })
    );

    let get = Request::builder()
        .uri("/files/csv__My_Data.csv")
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = send(&app, get).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"a,b\n1,2\n3,4\n");
}

#[tokio::test]
async fn upload_both_parts_and_ignore_unknown_fields() {
    let (_dir, app) = test_app();

    let (status, body) = send_json(
        &app,
        upload_request(&[
            ("spec", Some("notes.md"), "# spec\n"),
            ("comment", None, "ignored"),
            ("csv", Some("t.csv"), "x;y\n1;2\n"),
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["files"]["spec"]["stored_as"], "spec__notes.md");
    assert_eq!(body["files"]["csv"]["stored_as"], "csv__t.csv");
    assert!(body["files"].get("comment").is_none());
}

#[tokio::test]
async fn upload_without_labelled_parts_is_rejected() {
    let (_dir, app) = test_app();

    let (status, body) = send_json(&app, upload_request(&[("other", Some("a.txt"), "hi")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn upload_path_traversal_stays_in_content_dir() {
    let (dir, app) = test_app();

    let (status, body) = send_json(
        &app,
        upload_request(&[("spec", Some("../../etc/passwd"), "root")]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["files"]["spec"]["stored_as"], "spec__passwd");
    assert!(dir.path().join("uploads").join("spec__passwd").is_file());
}

#[tokio::test]
async fn plain_value_under_upload_label_is_not_a_file() {
    let (dir, app) = test_app();

    let (status, body) = send_json(&app, upload_request(&[("csv", None, "a,b\n1,2\n")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(!dir.path().join("uploads").join("csv__csv").exists());

    let (status, body) = send_json(
        &app,
        upload_request(&[("spec", None, "notes"), ("csv", Some("t.csv"), "a,b\n")]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["files"].get("spec").is_none());
    assert_eq!(body["files"]["csv"]["stored_as"], "csv__t.csv");
}

#[tokio::test]
async fn overlong_filename_is_a_validation_error() {
    let (_dir, app) = test_app();
    let long = format!("{}.csv", "x".repeat(300));

    let (status, body) = send_json(&app, upload_request(&[("csv", Some(long.as_str()), "a,b\n")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn in_progress_temp_files_are_not_served() {
    let (dir, app) = test_app();
    let uploads = dir.path().join("uploads");
    std::fs::write(uploads.join(".upload-abc123.part"), "a,b\n1,").unwrap();

    for uri in ["/files/.upload-abc123.part", "/files/%2Eupload-abc123.part"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn preview_missing_file_is_not_found() {
    let (_dir, app) = test_app();

    let (status, body) = send_json(&app, preview_request(json!({"filename": "csv__nope.csv"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn preview_with_explicit_delimiter_and_limit() {
    let (_dir, app) = test_app();
    send_json(
        &app,
        upload_request(&[("csv", Some("p.csv"), "a|b\n1|2\n3|4\n5|6\n")]),
    )
    .await;

    let (status, body) = send_json(
        &app,
        preview_request(json!({"filename": "csv__p.csv", "delimiter": "|", "maxLines": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delimiter"], "|");
    assert_eq!(body["rows"], json!([["1", "2"]]));
    assert_eq!(body["rowCount"], 1);
}

#[tokio::test]
async fn preview_rejects_multi_character_delimiter() {
    let (_dir, app) = test_app();
    send_json(&app, upload_request(&[("csv", Some("p.csv"), "a,b\n")])).await;

    let (status, body) = send_json(
        &app,
        preview_request(json!({"filename": "csv__p.csv", "delimiter": "::"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn preview_of_empty_file_without_delimiter_is_unprocessable() {
    let (_dir, app) = test_app();
    send_json(&app, upload_request(&[("csv", Some("empty.csv"), "")])).await;

    let (status, body) = send_json(&app, preview_request(json!({"filename": "csv__empty.csv"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "DETECTION_ERROR");
}

#[tokio::test]
async fn preview_with_malformed_json_is_bad_request() {
    let (_dir, app) = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/preview")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"filename\":"))
        .unwrap();
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn greeting_and_health_endpoints() {
    let (_dir, app) = test_app();

    for uri in ["/", "/api/hello"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = send_json(&app, request).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(body["message"].is_string(), "{uri}");
    }

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let request = Request::builder().uri("/ready").body(Body::empty()).unwrap();
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["components"]["content_dir"], "ready");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (_dir, app) = test_app();

    let request = Request::builder().uri("/api/nothing").body(Body::empty()).unwrap();
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let (_dir, app) = test_app();

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}
