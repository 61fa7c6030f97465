//! Route definitions.
//!
//! HTML views and downloads live at the root; the JSON API is mounted under
//! `/api`. The router receives `AppState` and passes it to all handlers via
//! Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Build the router with all routes and the upload size limit.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.server.max_upload_size_bytes as usize;

    let api_routes = Router::new()
        .merge(conversion_api_routes())
        .merge(catalog_routes())
        .merge(stats_routes())
        .route("/health", get(handlers::health::health));

    Router::new()
        .merge(page_routes())
        .route("/convert/{tool_id}", post(handlers::convert::convert_html))
        .route("/download/{file_name}", get(handlers::download::download))
        .nest("/api", api_routes)
        .fallback(handlers::pages::not_found)
        .layer(DefaultBodyLimit::max(max_upload))
        .with_state(state)
}

/// Presentation views
fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::pages::home))
        .route("/tool/{id}", get(handlers::pages::tool))
        .route("/stats", get(handlers::pages::stats))
        .route("/thankyou", get(handlers::pages::thank_you))
}

/// JSON conversion endpoint
fn conversion_api_routes() -> Router<AppState> {
    Router::new().route("/convert/{tool_id}", post(handlers::convert::convert_json))
}

/// Tool catalog
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/tools", get(handlers::tools::list_tools))
        .route("/tools/{id}", get(handlers::tools::get_tool))
}

/// Conversion counters
fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::stats::category_counts))
        .route("/stats/summary", get(handlers::stats::summary))
}
