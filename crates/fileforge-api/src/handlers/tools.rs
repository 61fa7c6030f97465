//! Catalog endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};

use fileforge_converter::{ToolCategory, ToolDescriptor};
use fileforge_core::error::AppError;

use crate::dto::ToolsQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/tools
pub async fn list_tools(
    State(state): State<AppState>,
    Query(query): Query<ToolsQuery>,
) -> Result<Json<Vec<ToolDescriptor>>, ApiError> {
    let tools = match query.category.as_deref() {
        Some(raw) => {
            let category: ToolCategory = raw.parse().map_err(AppError::validation)?;
            state.catalog.by_category(category).into_iter().cloned().collect()
        }
        None => state.catalog.list_all().to_vec(),
    };
    Ok(Json(tools))
}

/// GET /api/tools/{id}
pub async fn get_tool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ToolDescriptor>, ApiError> {
    state
        .catalog
        .find_by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Unknown tool: {id}")).into())
}
