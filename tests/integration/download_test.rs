//! Download endpoint tests.

use axum::http::{StatusCode, header};

use crate::helpers::{Multipart, TestApp, body_bytes};

async fn convert_csv(app: &TestApp) -> String {
    let outcome = app
        .convert_json("csv-to-json", Multipart::new().file("file", "report.csv", b"k,v\nx,1\n"))
        .await;
    outcome["fileName"].as_str().expect("fileName").to_string()
}

#[tokio::test]
async fn test_download_streams_output_with_headers() {
    let app = TestApp::new();
    let name = convert_csv(&app).await;

    let response = app.get(&format!("/download/{name}")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename*=UTF-8''report.json"
    );

    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).expect("json");
    assert_eq!(body, serde_json::json!([{"k": "x", "v": "1"}]));
}

#[tokio::test]
async fn test_download_missing_file_is_404() {
    let app = TestApp::new();
    let response = app.get("/download/nothing-here.pdf").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_rejects_traversal() {
    let app = TestApp::new();
    let secret = app.state.orchestrator.staging().root().join("secret.txt");
    tokio::fs::write(&secret, b"top secret").await.expect("write");

    for uri in ["/download/..%2Fsecret.txt", "/download/..", "/download/%2E%2E%2Fsecret.txt"] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn test_delete_after_download_removes_output() {
    let app = TestApp::with_config(|c| c.converter.delete_after_download = true);
    let name = convert_csv(&app).await;
    let path = app.state.orchestrator.staging().output_path(&name);
    assert!(path.exists());

    let response = app.get(&format!("/download/{name}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let _ = body_bytes(response).await;

    assert!(!path.exists());
    assert_eq!(app.get(&format!("/download/{name}")).await.status(), StatusCode::NOT_FOUND);
}
