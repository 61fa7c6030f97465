//! Multipart upload form → [`ConversionRequest`].

use std::str::FromStr;

use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};

use fileforge_converter::{ConversionError, ConversionParams, ConversionRequest, UploadedFile};

/// Read `file`/`files` parts plus the optional `width`, `height` and
/// `quality` fields. Parts without a file name or content are ignored;
/// blank numeric fields keep their defaults.
pub async fn read_conversion_form(mut multipart: Multipart) -> Result<ConversionRequest, ConversionError> {
    let mut files = Vec::new();
    let mut params = ConversionParams::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" | "files" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(malformed)?;
                if file_name.is_empty() || data.is_empty() {
                    continue;
                }
                files.push(UploadedFile::new(file_name, data));
            }
            "width" => {
                if let Some(v) = numeric(field, "width").await? {
                    params.width = v;
                }
            }
            "height" => {
                if let Some(v) = numeric(field, "height").await? {
                    params.height = v;
                }
            }
            "quality" => {
                if let Some(v) = numeric(field, "quality").await? {
                    params.quality = v;
                }
            }
            _ => {}
        }
    }

    Ok(ConversionRequest { files, params })
}

async fn numeric<T: FromStr>(field: Field<'_>, name: &str) -> Result<Option<T>, ConversionError> {
    let text = field.text().await.map_err(malformed)?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse()
        .map(Some)
        .map_err(|_| ConversionError::InvalidParams(format!("{name} must be a number, got '{text}'")))
}

fn malformed(err: MultipartError) -> ConversionError {
    ConversionError::InvalidParams(format!("Malformed upload: {}", err.body_text()))
}
