//! Stats endpoint tests.

use axum::http::StatusCode;

use crate::helpers::{Multipart, TestApp, body_json};

#[tokio::test]
async fn test_stats_invariant_after_mixed_attempts() {
    let app = TestApp::new();

    app.convert_json("csv-to-json", Multipart::new().file("file", "a.csv", b"a\n1\n")).await;
    app.convert_json("csv-to-json", Multipart::new().file("file", "b.csv", b"a\n")).await;
    app.convert_json("md-to-html", Multipart::new().file("file", "c.md", b"# hi")).await;
    app.convert_json("nope", Multipart::new().file("file", "d.txt", b"x")).await;

    let response = app.get("/api/stats").await;
    assert_eq!(response.status(), StatusCode::OK);
    let categories = body_json(response).await;
    assert_eq!(categories, serde_json::json!({"Document": 1, "Other": 1, "Spreadsheet": 2}));

    let summary = body_json(app.get("/api/stats/summary").await).await;
    let total = summary["totalConversions"].as_u64().expect("total");
    let success = summary["successCount"].as_u64().expect("success");
    let failure = summary["failureCount"].as_u64().expect("failure");
    assert_eq!(total, 4);
    assert_eq!(success, 2);
    assert_eq!(total, success + failure);
}

#[tokio::test]
async fn test_concurrent_requests_lose_no_updates() {
    let app = std::sync::Arc::new(TestApp::new());

    let mut handles = Vec::new();
    for i in 0..16 {
        let app = std::sync::Arc::clone(&app);
        handles.push(tokio::spawn(async move {
            let form = Multipart::new().file("file", &format!("{i}.csv"), b"x,y\n1,2\n");
            app.convert_json("csv-to-json", form).await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.expect("join")["success"], true);
    }

    let stats = app.state.stats.snapshot();
    assert_eq!(stats.total_conversions, 16);
    assert_eq!(stats.categories.get("Spreadsheet"), Some(&16));
}
