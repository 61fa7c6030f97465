//! Conversion endpoint tests.

use axum::http::StatusCode;

use crate::helpers::{Multipart, TestApp, body_text, png};

#[tokio::test]
async fn test_csv_to_json_via_api() {
    let app = TestApp::new();
    let form = Multipart::new().file("file", "people.csv", b"a,b\n1,2\n");

    let outcome = app.convert_json("csv-to-json", form).await;

    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["message"], "CSV converted to JSON!");
    assert_eq!(outcome["conversionType"], "CSV → JSON");
    let name = outcome["fileName"].as_str().expect("fileName");
    assert_eq!(outcome["downloadUrl"], format!("/download/{name}"));
    assert!(outcome["fileSize"].as_u64().expect("fileSize") > 0);
}

#[tokio::test]
async fn test_unknown_tool_is_failure_outcome_recorded_as_other() {
    let app = TestApp::new();
    let form = Multipart::new().file("file", "x.bin", b"data");

    let outcome = app.convert_json("teleport", form).await;

    assert_eq!(outcome["success"], false);
    assert!(outcome["message"].as_str().expect("message").contains("teleport"));
    assert!(outcome.get("downloadUrl").is_none());

    let stats = app.state.stats.snapshot();
    assert_eq!(stats.categories.get("Other"), Some(&1));
    assert_eq!(stats.failure_count, 1);
}

#[tokio::test]
async fn test_missing_file_is_failure_under_tool_category() {
    let app = TestApp::new();
    let form = Multipart::new().text("quality", "0.5");

    let outcome = app.convert_json("image-compress", form).await;

    assert_eq!(outcome["success"], false);
    let stats = app.state.stats.snapshot();
    assert_eq!(stats.categories.get("Image"), Some(&1));
}

#[tokio::test]
async fn test_empty_csv_fails() {
    let app = TestApp::new();
    let form = Multipart::new().file("file", "empty.csv", b"a,b\n");

    let outcome = app.convert_json("csv-to-json", form).await;

    assert_eq!(outcome["success"], false);
    assert!(outcome["message"].as_str().expect("message").starts_with("Conversion failed:"));
}

#[tokio::test]
async fn test_resize_reads_numeric_fields() {
    let app = TestApp::new();
    let form = Multipart::new()
        .file("file", "photo.png", &png(30, 30))
        .text("width", "200")
        .text("height", "100");

    let outcome = app.convert_json("image-resize", form).await;

    assert_eq!(outcome["success"], true, "{outcome}");
    assert_eq!(outcome["message"], "Image resized to 200x100!");
}

#[tokio::test]
async fn test_non_numeric_field_is_failure() {
    let app = TestApp::new();
    let form = Multipart::new()
        .file("file", "photo.png", &png(4, 4))
        .text("width", "wide");

    let outcome = app.convert_json("image-resize", form).await;
    assert_eq!(outcome["success"], false);
    assert!(outcome["message"].as_str().expect("message").contains("width"));
}

#[tokio::test]
async fn test_media_without_transcoder_reports_dependency() {
    let app = TestApp::new();
    let form = Multipart::new().file("file", "clip.mp4", b"\0\0\0\x18ftyp");

    let outcome = app.convert_json("mp4-to-mp3", form).await;

    assert_eq!(outcome["success"], false);
    assert_eq!(outcome["conversionType"], "Media Conversion");
    assert!(outcome["message"].as_str().expect("message").contains("FFmpeg is not installed"));
}

#[tokio::test]
async fn test_html_convert_always_renders_result_page() {
    let app = TestApp::new();

    let response = app
        .post_form("/convert/png-to-jpg", Multipart::new().file("file", "pic.png", &png(8, 8)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("PNG converted to JPG!"));
    assert!(html.contains("/download/pic_converted__"));

    let response = app
        .post_form("/convert/png-to-jpg", Multipart::new().file("file", "broken.png", b"nope"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Conversion failed"));
}
