//! Views, catalog API and health tests.

use axum::http::{StatusCode, header};

use crate::helpers::{TestApp, body_json, body_text};

#[tokio::test]
async fn test_home_lists_tools() {
    let app = TestApp::new();
    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("/tool/pdf-to-word"));
    assert!(html.contains("Spreadsheet"));
}

#[tokio::test]
async fn test_tool_page_and_unknown_tool_redirect() {
    let app = TestApp::new();

    let response = app.get("/tool/image-resize").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("name=\"width\""));

    let response = app.get("/tool/does-not-exist").await;
    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn test_unknown_route_renders_error_page() {
    let app = TestApp::new();
    let response = app.get("/no/such/page").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("404"));
}

#[tokio::test]
async fn test_static_views() {
    let app = TestApp::new();
    assert_eq!(app.get("/stats").await.status(), StatusCode::OK);
    assert!(body_text(app.get("/thankyou").await).await.contains("Thank you"));
}

#[tokio::test]
async fn test_tools_api() {
    let app = TestApp::new();

    let all = body_json(app.get("/api/tools").await).await;
    let all = all.as_array().expect("array");
    assert_eq!(all.len(), app.state.catalog.len());
    assert_eq!(all[0]["id"], "pdf-to-word");
    assert_eq!(all[0]["category"], "PDF");

    let media = body_json(app.get("/api/tools?category=media").await).await;
    assert!(media.as_array().expect("array").iter().all(|t| t["category"] == "Media"));

    assert_eq!(app.get("/api/tools?category=video").await.status(), StatusCode::BAD_REQUEST);

    let one = body_json(app.get("/api/tools/csv-to-json").await).await;
    assert_eq!(one["acceptedExtensions"], serde_json::json!(["csv"]));
    assert_eq!(app.get("/api/tools/nope").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_missing_transcoder() {
    let app = TestApp::new();
    let health = body_json(app.get("/api/health").await).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["mediaTranscoder"], false);
}
