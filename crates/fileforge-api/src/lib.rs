//! # fileforge-api
//!
//! HTTP layer for FileForge built on Axum.
//!
//! Routes uploads to the conversion orchestrator, records every attempt in
//! the stats recorder, streams outputs back and renders the HTML views.

pub mod app;
pub mod dispatch;
pub mod dto;
pub mod error;
pub mod form;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod views;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
