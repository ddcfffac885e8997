//! smartctl-exporter - Prometheus exporter for SMART disk-health telemetry.
//!
//! The exporter invokes `smartctl -iA <device>` against operator-supplied
//! block devices on every scrape, parses the free-form attribute report into
//! structured records ([`smart`]) and republishes a fixed set of ten health
//! attributes as labeled gauges ([`collector`]).
//!
//! Collection follows the describe/collect protocol of the prometheus
//! registry. A failing device never fails the scrape or the process: the
//! failure is surfaced as a single `smartctl_scrape_error` sample and the
//! raw smartctl output is logged for diagnosis.

pub mod cli;
pub mod collector;
pub mod commands;
pub mod config;
pub mod handlers;
pub mod probe;
pub mod smart;
pub mod state;

// Re-export main types for convenience
pub use collector::{SmartCollector, TrackedAttribute, NAMESPACE, TRACKED_ATTRIBUTES};
pub use probe::{HostInfo, ProbeError, Smartctl, SysHostInfo, SystemSmartctl};
pub use smart::{parse, AttributeRecord, DeviceReport};
