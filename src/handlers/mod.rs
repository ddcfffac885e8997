//! HTTP endpoint handlers for the exporter.
//!
//! This module provides handlers for all HTTP endpoints:
//! - the configured metrics path (default `/metrics`): Prometheus metrics
//! - `/`: permanent redirect to the metrics path

pub mod metrics;
pub mod root;

// Re-export handlers
pub use metrics::metrics_handler;
pub use root::root_handler;
