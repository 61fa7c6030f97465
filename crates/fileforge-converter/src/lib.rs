//! # fileforge-converter
//!
//! The tool catalog, the conversion orchestrator and its back ends, and the
//! process-wide conversion stats.
//!
//! Office and media conversions shell out to `soffice` and `ffmpeg` under a
//! supervised, time-bounded child process. PDF work runs on PDFium; images,
//! tables and Markdown are converted in-process.

pub mod archive;
pub mod catalog;
pub mod error;
pub mod executor;
pub mod filesystem;
pub mod imaging;
pub mod markdown;
pub mod media;
pub mod models;
pub mod office;
pub mod orchestrator;
pub mod pdf;
pub mod staging;
pub mod stats;
pub mod tabular;

#[cfg(all(test, unix))]
mod testing;

pub use catalog::{ToolCatalog, ToolCategory, ToolDescriptor, ToolOperation};
pub use error::ConversionError;
pub use filesystem::FsUtils;
pub use models::{ConversionOutcome, ConversionParams, ConversionRequest, UploadedFile};
pub use orchestrator::ConversionOrchestrator;
pub use staging::StagingArea;
pub use stats::{OTHER_CATEGORY, StatsRecorder, StatsSnapshot};
