//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use fileforge_api::{AppState, build_app};
use fileforge_converter::ConversionOrchestrator;
use fileforge_core::config::AppConfig;

const BOUNDARY: &str = "fileforge-test-boundary";

/// Test application context
pub struct TestApp {
    /// Shared state, for inspecting stats and outputs
    pub state: AppState,
    /// Temp root; removed on drop
    _dir: TempDir,
}

impl TestApp {
    /// App with a private temp root and no external converters installed.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Same as [`TestApp::new`], with config tweaks.
    pub fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = AppConfig::default();
        config.converter.temp_root = Some(dir.path().to_path_buf());
        config.converter.office_binary = "/nonexistent/soffice".to_string();
        config.converter.media_binary = "/nonexistent/ffmpeg".to_string();
        tweak(&mut config);

        let orchestrator =
            ConversionOrchestrator::new(&config.converter, CancellationToken::new()).expect("orchestrator");
        Self {
            state: AppState::new(config, orchestrator),
            _dir: dir,
        }
    }

    fn router(&self) -> Router {
        build_app(self.state.clone())
    }

    /// Send a request through the full middleware stack.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.expect("infallible router")
    }

    /// GET `uri`.
    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).expect("request")).await
    }

    /// POST a multipart form to `uri`.
    pub async fn post_form(&self, uri: &str, form: Multipart) -> Response<Body> {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(form.finish()))
            .expect("request");
        self.send(request).await
    }

    /// POST to the JSON conversion API and decode the outcome.
    pub async fn convert_json(&self, tool_id: &str, form: Multipart) -> Value {
        let response = self.post_form(&format!("/api/convert/{tool_id}"), form).await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }
}

/// Minimal multipart/form-data body builder.
#[derive(Default)]
pub struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file part.
    pub fn file(mut self, field: &str, file_name: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Add a plain text field.
    pub fn text(mut self, field: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// Collect a response body.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
        .to_vec()
}

/// Collect a response body as UTF-8.
pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).expect("utf8 body")
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

/// A small opaque PNG.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("encode png");
    buf
}
