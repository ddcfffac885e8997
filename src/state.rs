//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers.

use prometheus::{Gauge, Registry};
use std::sync::Arc;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests.
pub struct AppState {
    /// Registry holding the SMART collectors and exporter self-metrics.
    pub registry: Registry,
    /// Effective URL path the metrics are served under.
    pub metrics_path: String,
    /// Time spent serving the last metrics request.
    pub scrape_duration: Gauge,
}
