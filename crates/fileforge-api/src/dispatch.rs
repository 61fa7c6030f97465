//! Request-boundary conversion dispatch.
//!
//! Every call yields a [`ConversionOutcome`] and exactly one stats record;
//! no conversion failure escapes as an HTTP error.

use std::panic::AssertUnwindSafe;
use std::time::Instant;

use axum::extract::Multipart;
use futures::FutureExt;
use tracing::{error, warn};

use fileforge_converter::{ConversionOutcome, OTHER_CATEGORY, ToolCategory, ToolDescriptor};

use crate::form::read_conversion_form;
use crate::state::AppState;

/// Label for failed media conversions.
const MEDIA_FAILURE_LABEL: &str = "Media Conversion";

/// Parse the upload, run `tool_id` and record the attempt.
pub async fn dispatch(state: &AppState, tool_id: &str, multipart: Multipart) -> ConversionOutcome {
    let started = Instant::now();

    let Some(tool) = state.catalog.find_by_id(tool_id) else {
        warn!(tool = %tool_id, "Unknown tool requested");
        state.stats.record(OTHER_CATEGORY, false);
        return ConversionOutcome::failure(format!("Unknown tool: {tool_id}"), "Unknown", started.elapsed());
    };
    let category = tool.category.as_str();

    let request = match read_conversion_form(multipart).await {
        Ok(request) => request,
        Err(e) => {
            warn!(tool = tool.id, error = %e, "Rejected upload form");
            state.stats.record(category, false);
            return ConversionOutcome::failure(e.to_string(), failure_label(tool), started.elapsed());
        }
    };

    let result = AssertUnwindSafe(state.orchestrator.convert(tool, request))
        .catch_unwind()
        .await;

    let outcome = match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            error!(tool = tool.id, error = %e, "Conversion failed");
            ConversionOutcome::failure(
                format!("Conversion failed: {e}"),
                failure_label(tool),
                started.elapsed(),
            )
        }
        Err(_) => {
            error!(tool = tool.id, "Conversion panicked");
            ConversionOutcome::failure(
                "Conversion failed: an unexpected internal error occurred",
                failure_label(tool),
                started.elapsed(),
            )
        }
    };

    state.stats.record(category, outcome.success);
    outcome
}

fn failure_label(tool: &ToolDescriptor) -> &'static str {
    match tool.category {
        ToolCategory::Media => MEDIA_FAILURE_LABEL,
        _ => tool.name,
    }
}
