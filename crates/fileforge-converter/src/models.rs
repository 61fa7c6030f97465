//! Domain models: uploaded files, conversion parameters, outcomes.

use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::ConversionError;
use crate::filesystem::FsUtils;

/// One uploaded file payload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Name as sent by the client.
    pub name: String,
    /// Raw content.
    pub data: Bytes,
}

impl UploadedFile {
    /// Create an upload from a name and payload.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Upper-cased extension, for labels like "PNG → JPG".
    pub fn extension_label(&self) -> String {
        FsUtils::extension_lower(&self.name)
            .map(|e| e.to_ascii_uppercase())
            .unwrap_or_else(|| "FILE".to_string())
    }
}

/// Optional numeric parameters of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionParams {
    /// Target width in pixels for resize.
    pub width: u32,
    /// Target height in pixels for resize.
    pub height: u32,
    /// Quality factor in `[0, 1]` for compression.
    pub quality: f32,
}

impl ConversionParams {
    /// Largest accepted resize edge.
    pub const MAX_DIMENSION: u32 = 10_000;

    /// Reject dimensions and quality outside their ranges.
    pub fn validate(&self) -> Result<(), ConversionError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConversionError::InvalidParams(
                "width and height must be positive".to_string(),
            ));
        }
        if self.width > Self::MAX_DIMENSION || self.height > Self::MAX_DIMENSION {
            return Err(ConversionError::InvalidParams(format!(
                "width and height must not exceed {}",
                Self::MAX_DIMENSION
            )));
        }
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(ConversionError::InvalidParams(
                "quality must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ConversionParams {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            quality: 0.8,
        }
    }
}

/// Everything the orchestrator needs for one attempt.
#[derive(Debug, Clone, Default)]
pub struct ConversionRequest {
    /// Uploaded files, in submission order.
    pub files: Vec<UploadedFile>,
    /// Numeric parameters.
    pub params: ConversionParams,
}

impl ConversionRequest {
    /// A request for a single file with default parameters.
    pub fn single(file: UploadedFile) -> Self {
        Self {
            files: vec![file],
            params: ConversionParams::default(),
        }
    }
}

/// Structured result of one conversion attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOutcome {
    /// Whether an output file was produced.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
    /// Output file name, for downloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Output size in bytes.
    pub file_size: u64,
    /// Output size for display.
    pub file_size_formatted: String,
    /// Elapsed processing time.
    pub processing_time_ms: u64,
    /// `/download/<file_name>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    /// Label such as "PDF → Word".
    pub conversion_type: String,
}

impl ConversionOutcome {
    /// A successful outcome pointing at a staged output.
    pub fn success(
        message: impl Into<String>,
        conversion_type: impl Into<String>,
        file_name: String,
        file_size: u64,
        elapsed: Duration,
    ) -> Self {
        Self {
            success: true,
            message: message.into(),
            download_url: Some(format!("/download/{file_name}")),
            file_name: Some(file_name),
            file_size,
            file_size_formatted: FsUtils::format_size(file_size),
            processing_time_ms: elapsed.as_millis() as u64,
            conversion_type: conversion_type.into(),
        }
    }

    /// A failed outcome with a human-readable cause.
    pub fn failure(
        message: impl Into<String>,
        conversion_type: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            success: false,
            message: message.into(),
            file_name: None,
            file_size: 0,
            file_size_formatted: FsUtils::format_size(0),
            processing_time_ms: elapsed.as_millis() as u64,
            download_url: None,
            conversion_type: conversion_type.into(),
        }
    }
}
