//! Request and response DTOs for the JSON API.

use serde::{Deserialize, Serialize};

/// `GET /api/health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"ok"` while the server answers.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since startup.
    pub uptime_seconds: u64,
    /// Whether the media transcoder is installed.
    pub media_transcoder: bool,
    /// Whether the PDF engine library can be loaded.
    pub pdf_engine: bool,
}

/// `GET /api/tools` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolsQuery {
    /// Restrict to one category (case-insensitive).
    pub category: Option<String>,
}
