//! # fileforge-core
//!
//! Core crate for FileForge. Contains configuration schemas and the
//! unified error system shared by the converter and the HTTP layer.
//!
//! This crate has **no** internal dependencies on other FileForge crates.

pub mod config;
pub mod error;
pub mod result;

pub use config::AppConfig;
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
