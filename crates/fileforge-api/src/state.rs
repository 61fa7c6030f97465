//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use fileforge_converter::{ConversionOrchestrator, StatsRecorder, ToolCatalog};
use fileforge_core::config::AppConfig;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Read-only tool registry
    pub catalog: Arc<ToolCatalog>,
    /// Conversion pipeline
    pub orchestrator: Arc<ConversionOrchestrator>,
    /// Process-wide conversion counters
    pub stats: Arc<StatsRecorder>,
    /// Server start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Assemble state around an already-built orchestrator.
    pub fn new(config: AppConfig, orchestrator: ConversionOrchestrator) -> Self {
        Self {
            config: Arc::new(config),
            catalog: Arc::new(ToolCatalog::builtin()),
            orchestrator: Arc::new(orchestrator),
            stats: Arc::new(StatsRecorder::new()),
            started_at: Instant::now(),
        }
    }
}
