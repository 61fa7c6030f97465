//! HTML page handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::state::AppState;
use crate::views;

/// GET /
pub async fn home(State(state): State<AppState>) -> Html<String> {
    Html(views::home(&state.catalog, &state.stats.snapshot()))
}

/// GET /tool/{id}; unknown ids go back to the home page.
pub async fn tool(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.catalog.find_by_id(&id) {
        Some(tool) => Html(views::tool(tool)).into_response(),
        None => Redirect::to("/").into_response(),
    }
}

/// GET /stats
pub async fn stats(State(state): State<AppState>) -> Html<String> {
    Html(views::stats(&state.stats.snapshot()))
}

/// GET /thankyou
pub async fn thank_you() -> Html<String> {
    Html(views::thank_you())
}

/// Fallback for unknown routes.
pub async fn not_found() -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        Html(views::error_page(404, "The page you are looking for does not exist.")),
    )
}
