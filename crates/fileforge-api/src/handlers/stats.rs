//! Stats endpoints.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;

use fileforge_converter::StatsSnapshot;

use crate::state::AppState;

/// GET /api/stats
pub async fn category_counts(State(state): State<AppState>) -> Json<BTreeMap<String, u64>> {
    Json(state.stats.snapshot().categories)
}

/// GET /api/stats/summary
pub async fn summary(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.stats.snapshot())
}
