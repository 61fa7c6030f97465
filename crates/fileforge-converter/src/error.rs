//! Unified error type for the conversion pipeline.
//!
//! All subsystem errors (staging, process execution, image/PDF codecs,
//! tabular parsing) are consolidated into a single `ConversionError` enum
//! that maps cleanly to `fileforge_core::error::AppError`.

use std::path::PathBuf;

use fileforge_core::error::AppError;
use thiserror::Error;

use crate::executor::ExecutorError;

/// Unified error type for all conversion operations.
#[derive(Debug, Error)]
pub enum ConversionError {
    // --- Request validation ---
    /// No file was supplied for a tool that needs at least one.
    #[error("No file uploaded")]
    NoInput,

    /// The uploaded file's extension is not accepted by the tool.
    #[error("Unsupported file type for {tool}: '{file_name}' (accepted: {accepted})")]
    UnsupportedFileType {
        /// Tool id the file was submitted to.
        tool: String,
        /// Original upload name.
        file_name: String,
        /// Comma-separated accepted extensions.
        accepted: String,
    },

    /// Numeric parameters outside their valid range.
    #[error("Invalid conversion parameters: {0}")]
    InvalidParams(String),

    // --- Input content ---
    /// The input could not be decoded as the expected format.
    #[error("Cannot read {file_name}: {detail}")]
    Undecodable {
        /// Original upload name.
        file_name: String,
        /// Decoder message.
        detail: String,
    },

    /// A structured input contained no data rows.
    #[error("{0}")]
    EmptyTable(String),

    /// A structured input did not have the expected shape.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    // --- External processes ---
    /// The external converter exited with a non-zero status.
    #[error("{program} failed (exit code {code}): {output}")]
    ProcessFailed {
        /// Program name as invoked.
        program: String,
        /// Exit code, `-1` when terminated by a signal.
        code: i32,
        /// Combined stdout and stderr.
        output: String,
    },

    /// The external converter did not finish within its deadline and was killed.
    #[error("{program} timed out after {timeout_seconds} seconds")]
    Timeout {
        /// Program name as invoked.
        program: String,
        /// The deadline that was exceeded.
        timeout_seconds: u64,
    },

    /// The conversion was cancelled by server shutdown.
    #[error("Conversion was cancelled")]
    Cancelled,

    /// A required external program is not installed.
    #[error("{dependency} is not installed. {hint}")]
    DependencyMissing {
        /// Human name of the missing program.
        dependency: String,
        /// What the operator should do about it.
        hint: String,
    },

    /// The converter reported success but produced no file.
    #[error("Conversion produced no .{extension} output file")]
    OutputMissing {
        /// Expected output extension.
        extension: String,
    },

    // --- PDF engine ---
    /// PDFium could not be bound or rejected the document.
    #[error("PDF engine error: {0}")]
    PdfEngine(String),

    /// The tool exists in the catalog but has no working back end.
    #[error("{0}")]
    NotImplemented(String),

    // --- Generic errors ---
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP library error.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Image codec error.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Tokio task join error.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// A staged path is not valid UTF-8 and cannot be passed to a converter.
    #[error("Path is not valid UTF-8: {path}")]
    InvalidUtf8Path {
        /// The offending path.
        path: PathBuf,
    },
}

impl From<ExecutorError> for ConversionError {
    fn from(err: ExecutorError) -> Self {
        match err {
            ExecutorError::Timeout {
                program,
                timeout_seconds,
            } => Self::Timeout {
                program,
                timeout_seconds,
            },
            ExecutorError::ProcessFailed {
                program,
                code,
                output,
            } => Self::ProcessFailed {
                program,
                code,
                output,
            },
            ExecutorError::Cancelled => Self::Cancelled,
            ExecutorError::Spawn { program, source }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::DependencyMissing {
                    dependency: program,
                    hint: "Install it or set its path in the converter configuration.".to_string(),
                }
            }
            ExecutorError::Spawn { source, .. } => Self::Io(source),
            ExecutorError::Io(e) => Self::Io(e),
        }
    }
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        match &err {
            ConversionError::NoInput
            | ConversionError::UnsupportedFileType { .. }
            | ConversionError::InvalidParams(_) => AppError::validation(err.to_string()),
            ConversionError::Undecodable { .. }
            | ConversionError::EmptyTable(_)
            | ConversionError::MalformedInput(_)
            | ConversionError::Image(_)
            | ConversionError::Json(_)
            | ConversionError::Csv(_) => AppError::conversion(err.to_string()),
            ConversionError::ProcessFailed { .. }
            | ConversionError::Timeout { .. }
            | ConversionError::OutputMissing { .. } => AppError::external_service(err.to_string()),
            ConversionError::DependencyMissing { .. }
            | ConversionError::PdfEngine(_)
            | ConversionError::Cancelled => AppError::service_unavailable(err.to_string()),
            ConversionError::NotImplemented(_) => AppError::not_implemented(err.to_string()),
            _ => AppError::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileforge_core::error::ErrorKind;

    #[test]
    fn test_timeout_and_failure_messages_differ() {
        let timeout = ConversionError::Timeout {
            program: "soffice".to_string(),
            timeout_seconds: 120,
        };
        let failed = ConversionError::ProcessFailed {
            program: "soffice".to_string(),
            code: 1,
            output: "Error: source file could not be loaded".to_string(),
        };
        assert_eq!(timeout.to_string(), "soffice timed out after 120 seconds");
        assert!(failed.to_string().contains("exit code 1"));
        assert!(failed.to_string().contains("could not be loaded"));
    }

    #[test]
    fn test_spawn_not_found_becomes_dependency_missing() {
        let err: ConversionError = ExecutorError::Spawn {
            program: "soffice".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }
        .into();
        assert!(matches!(err, ConversionError::DependencyMissing { .. }));
    }

    #[test]
    fn test_app_error_mapping() {
        let app: AppError = ConversionError::NoInput.into();
        assert_eq!(app.kind, ErrorKind::Validation);

        let app: AppError = ConversionError::EmptyTable("CSV has no data rows".into()).into();
        assert_eq!(app.kind, ErrorKind::Conversion);

        let app: AppError = ConversionError::NotImplemented("later".into()).into();
        assert_eq!(app.kind, ErrorKind::NotImplemented);
    }
}
