//! Check command implementation.
//!
//! Probes the configured devices once, outside the HTTP server, and prints
//! the parsed attribute values. Useful to verify smartctl access and device
//! support before wiring the exporter into Prometheus.

use anyhow::Result;

use crate::collector::TRACKED_ATTRIBUTES;
use crate::config::Config;
use crate::probe::{ProbeError, Smartctl, SystemSmartctl, DEFAULT_SMARTCTL_BIN};
use crate::smart;

/// Probes every configured device and prints its tracked attributes.
pub fn command_check(verbose: bool, config: &Config) -> Result<()> {
    println!("🧪 smartctl-exporter - Check Mode");
    println!("=================================");

    let devices = config.devices.clone().unwrap_or_default();
    if devices.is_empty() {
        println!("\n⚠️  No devices configured - nothing to probe (use -d /dev/sdX)");
        return Ok(());
    }

    let smartctl = SystemSmartctl::new(
        config
            .smartctl_bin
            .as_deref()
            .unwrap_or(DEFAULT_SMARTCTL_BIN),
    );

    let mut failures = 0usize;

    for device in &devices {
        println!("\n🔄 Probing {}:", device);

        match smartctl.read_device(device) {
            Ok(text) => {
                if verbose {
                    println!("{text}");
                }

                let report = smart::parse(&text);
                let serial = report.info("Serial Number");
                if serial.is_empty() {
                    println!("   └─ ⚠️  no serial number reported - device would be skipped");
                    continue;
                }

                println!("   ├─ Model:  {}", report.info("Device Model"));
                println!("   ├─ Serial: {}", serial);
                for attr in &TRACKED_ATTRIBUTES {
                    println!(
                        "   ├─ {} (id {}): {}",
                        attr.metric,
                        attr.id,
                        report.attribute(attr.id).raw
                    );
                }
                println!("   └─ {} attributes parsed in total", report.attribute_count());
            }
            Err(err) => {
                failures += 1;
                if verbose {
                    if let ProbeError::NonZeroExit { output, .. } = &err {
                        println!("{output}");
                    }
                }
                println!("   └─ ❌ {}", err);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} devices failed", failures, devices.len());
    }

    Ok(())
}
