//! Streams finished outputs back to the client.

use std::path::PathBuf;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::{StreamExt, stream};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use fileforge_converter::FsUtils;
use fileforge_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Bytes escaped in an RFC 5987 `filename*` value. Unreserved punctuation
/// stays literal.
const FILENAME_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'-').remove(b'_').remove(b'~');

/// GET /download/{file_name}
pub async fn download(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, ApiError> {
    let path = state
        .orchestrator
        .staging()
        .resolve_download(&file_name)
        .await
        .ok_or_else(|| AppError::not_found(format!("File not found: {file_name}")))?;

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| AppError::storage(format!("Failed to open output: {e}")))?;
    let length = file
        .metadata()
        .await
        .map_err(|e| AppError::storage(format!("Failed to stat output: {e}")))?
        .len();

    let chunks = ReaderStream::new(file);
    let body = if state.config.converter.delete_after_download {
        Body::from_stream(chunks.chain(remove_when_done(path)))
    } else {
        Body::from_stream(chunks)
    };

    debug!(file = %file_name, bytes = length, "Serving download");
    Ok((
        [
            (header::CONTENT_TYPE, FsUtils::content_type_for(&file_name).to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&file_name)),
            (header::CONTENT_LENGTH, length.to_string()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        body,
    )
        .into_response())
}

/// `attachment` disposition naming the file without its uniqueness suffix.
pub fn content_disposition(file_name: &str) -> String {
    let display = FsUtils::display_name(file_name);
    format!(
        "attachment; filename*=UTF-8''{}",
        utf8_percent_encode(&display, FILENAME_ESCAPES)
    )
}

/// Empty stream that deletes `path` when polled. Chained after the file
/// stream, it only runs once every chunk has been read.
fn remove_when_done(path: PathBuf) -> impl futures::Stream<Item = std::io::Result<Bytes>> + Send {
    stream::once(async move {
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(path = %path.display(), "Removed downloaded output"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove downloaded output"),
        }
        None::<std::io::Result<Bytes>>
    })
    .filter_map(futures::future::ready)
}
