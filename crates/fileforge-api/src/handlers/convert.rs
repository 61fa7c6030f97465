//! Conversion endpoints. Both always answer 200 with an outcome.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::response::Html;

use fileforge_converter::ConversionOutcome;

use crate::dispatch::dispatch;
use crate::state::AppState;
use crate::views;

/// POST /convert/{tool_id}
pub async fn convert_html(
    State(state): State<AppState>,
    Path(tool_id): Path<String>,
    multipart: Multipart,
) -> Html<String> {
    let outcome = dispatch(&state, &tool_id, multipart).await;
    Html(views::result(&outcome, state.catalog.find_by_id(&tool_id)))
}

/// POST /api/convert/{tool_id}
pub async fn convert_json(
    State(state): State<AppState>,
    Path(tool_id): Path<String>,
    multipart: Multipart,
) -> Json<ConversionOutcome> {
    Json(dispatch(&state, &tool_id, multipart).await)
}
