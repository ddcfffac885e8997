//! Prometheus collector for SMART attributes.
//!
//! One `SmartCollector` serves the operator-supplied device list. Every
//! scrape runs one collection cycle per device: invoke smartctl, parse the
//! report and publish the raw values of the tracked attributes as gauges.
//! A cycle that fails (binary missing, non-zero exit) is translated into a
//! single `smartctl_scrape_error` sample for that device instead of an
//! error crossing the collection boundary.

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, Opts};
use tracing::{debug, error};

use crate::probe::{HostInfo, ProbeError, Smartctl, SysHostInfo, SystemSmartctl};
use crate::smart;

/// Metric name prefix for all exported series.
pub const NAMESPACE: &str = "smartctl";

/// Label schema shared by every attribute sample.
pub const SAMPLE_LABELS: [&str; 4] = ["device", "serial", "model", "host"];

/// Static mapping from SMART attribute id to exported metric name.
pub struct TrackedAttribute {
    pub id: u8,
    pub metric: &'static str,
    pub help: &'static str,
}

/// The ten attributes surfaced by the exporter. Metric names follow the
/// smartmontools attribute names, which is why most of them are capitalized.
pub const TRACKED_ATTRIBUTES: [TrackedAttribute; 10] = [
    TrackedAttribute {
        id: 9,
        metric: "power_on_hours",
        help: "Power on hours",
    },
    TrackedAttribute {
        id: 5,
        metric: "Reallocated_Sector_Ct",
        help: "Reallocated_Sector_Ct",
    },
    TrackedAttribute {
        id: 187,
        metric: "Reported_Uncorrect",
        help: "Reported_Uncorrect",
    },
    TrackedAttribute {
        id: 188,
        metric: "Command_Timeout",
        help: "Command_Timeout",
    },
    TrackedAttribute {
        id: 193,
        metric: "Load_Cycle_Count",
        help: "Load_Cycle_Count",
    },
    TrackedAttribute {
        id: 194,
        metric: "temperature",
        help: "Temperature",
    },
    TrackedAttribute {
        id: 197,
        metric: "Current_Pending_Sector",
        help: "Current_Pending_Sector",
    },
    TrackedAttribute {
        id: 198,
        metric: "Offline_Uncorrectable",
        help: "Offline_Uncorrectable",
    },
    TrackedAttribute {
        id: 241,
        metric: "Total_LBAs_Written",
        help: "Total_LBAs_Written",
    },
    TrackedAttribute {
        id: 242,
        metric: "Total_LBAs_Read",
        help: "Total_LBAs_Read",
    },
];

/// Result of one collection cycle against a single device.
enum CycleOutcome {
    /// Shared label tuple plus one value per tracked attribute.
    Samples {
        labels: [String; 4],
        values: Vec<f64>,
    },
    /// Unconfigured or serial-less device; benign, emits nothing.
    Skipped,
    /// Invocation failed; emits exactly one error sample.
    Failed(ProbeError),
}

/// Collector implementing the describe/collect protocol of the prometheus
/// registry for a set of block devices.
///
/// Only the immutable descriptors live on the struct. Sample state is built
/// fresh inside every `collect()` call, so overlapping scrapes each stage
/// their samples independently and never see each other's partial state.
pub struct SmartCollector {
    devices: Vec<String>,
    smartctl: Box<dyn Smartctl>,
    host: Box<dyn HostInfo>,
    descs: Vec<Desc>,
}

impl SmartCollector {
    /// Creates a collector using the real smartctl binary and kernel
    /// hostname.
    pub fn new(devices: Vec<String>, smartctl_bin: &str) -> prometheus::Result<Self> {
        Self::with_collaborators(
            devices,
            Box::new(SystemSmartctl::new(smartctl_bin)),
            Box::new(SysHostInfo),
        )
    }

    /// Creates a collector with injected collaborators; tests substitute
    /// fakes here.
    pub fn with_collaborators(
        devices: Vec<String>,
        smartctl: Box<dyn Smartctl>,
        host: Box<dyn HostInfo>,
    ) -> prometheus::Result<Self> {
        let (attributes, scrape_error) = Self::sample_gauges()?;
        let descs = attributes
            .iter()
            .chain(std::iter::once(&scrape_error))
            .flat_map(|gauge| gauge.desc().into_iter().cloned())
            .collect();

        Ok(Self {
            devices,
            smartctl,
            host,
            descs,
        })
    }

    /// Devices this collector probes on every scrape.
    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    /// Builds the gauge families holding the samples of one scrape: one
    /// family per entry of [`TRACKED_ATTRIBUTES`] (same order) plus the
    /// scrape-error family.
    fn sample_gauges() -> prometheus::Result<(Vec<GaugeVec>, GaugeVec)> {
        let attributes = TRACKED_ATTRIBUTES
            .iter()
            .map(|attr| {
                GaugeVec::new(
                    Opts::new(format!("{NAMESPACE}_{}", attr.metric), attr.help),
                    &SAMPLE_LABELS,
                )
            })
            .collect::<prometheus::Result<Vec<_>>>()?;

        let scrape_error = GaugeVec::new(
            Opts::new(
                format!("{NAMESPACE}_scrape_error"),
                "Whether collecting SMART data from the device failed this scrape (1 = failed)",
            ),
            &["device"],
        )?;

        Ok((attributes, scrape_error))
    }

    /// Runs one cycle against a single device.
    ///
    /// Parsing never fails a cycle; only invocation does. A report without a
    /// serial number marks an unsupported or offline device and is skipped
    /// silently so a flapping device does not show up as a scrape error.
    fn cycle(&self, device: &str) -> CycleOutcome {
        if device.is_empty() {
            return CycleOutcome::Skipped;
        }

        let text = match self.smartctl.read_device(device) {
            Ok(text) => text,
            Err(err) => return CycleOutcome::Failed(err),
        };

        let report = smart::parse(&text);

        let serial = report.info("Serial Number");
        if serial.is_empty() {
            debug!("no serial number in SMART report for {device}, skipping");
            return CycleOutcome::Skipped;
        }

        let labels = [
            device.to_string(),
            serial.to_string(),
            report.info("Device Model").to_string(),
            self.host.hostname(),
        ];

        // A missing attribute reads as raw value 0, keeping series presence
        // stable across cycles even for attributes a device never reports.
        let values = TRACKED_ATTRIBUTES
            .iter()
            .map(|attr| report.attribute(attr.id).raw as f64)
            .collect();

        CycleOutcome::Samples { labels, values }
    }
}

impl Collector for SmartCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        // Per-cycle sample state. The gauge names are static and were
        // validated at construction, so this cannot fail at scrape time.
        let Ok((attributes, scrape_error)) = Self::sample_gauges() else {
            error!("failed to construct SMART gauge families");
            return Vec::new();
        };

        for device in &self.devices {
            match self.cycle(device) {
                CycleOutcome::Samples { labels, values } => {
                    let label_values: Vec<&str> = labels.iter().map(String::as_str).collect();
                    for (gauge, value) in attributes.iter().zip(values) {
                        gauge.with_label_values(&label_values).set(value);
                    }
                }
                CycleOutcome::Skipped => {}
                CycleOutcome::Failed(err) => {
                    if let ProbeError::NonZeroExit { output, .. } = &err {
                        error!("smartctl output for {device}:\n{output}");
                    }
                    error!("collecting SMART metrics for {device} failed: {err}");
                    scrape_error.with_label_values(&[device]).set(1.0);
                }
            }
        }

        attributes
            .iter()
            .chain(std::iter::once(&scrape_error))
            .flat_map(|gauge| gauge.collect())
            .filter(|family| !family.get_metric().is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc::{channel, Receiver, Sender};
    use std::sync::{Arc, Mutex};
    use std::thread;

    const FULL_REPORT: &str = "\
Device Model:     FastSSD
Serial Number:    XYZ123

ID# ATTRIBUTE_NAME          FLAG     VALUE WORST THRESH TYPE      UPDATED  WHEN_FAILED RAW_VALUE
9 Power_On_Hours 0x0032 100 100 000 Old_age Always - 12345
194 Temperature_Celsius 0x0022 069 052 000 Old_age Always - 31
";

    /// Fake smartctl keyed by device path; unknown devices fail with a
    /// non-zero exit.
    struct FakeSmartctl(HashMap<String, String>);

    impl FakeSmartctl {
        fn single(device: &str, report: &str) -> Self {
            Self(HashMap::from([(device.to_string(), report.to_string())]))
        }

        fn failing() -> Self {
            Self(HashMap::new())
        }
    }

    impl Smartctl for FakeSmartctl {
        fn read_device(&self, device: &str) -> Result<String, ProbeError> {
            self.0
                .get(device)
                .cloned()
                .ok_or_else(|| ProbeError::NonZeroExit {
                    command: format!("smartctl -iA {device}"),
                    status: ExitStatus::from_raw(256),
                    output: "Smartctl open device failed".to_string(),
                })
        }
    }

    struct FakeHost;

    impl HostInfo for FakeHost {
        fn hostname(&self) -> String {
            "testhost".to_string()
        }
    }

    fn collector(devices: &[&str], smartctl: FakeSmartctl) -> SmartCollector {
        SmartCollector::with_collaborators(
            devices.iter().map(|d| d.to_string()).collect(),
            Box::new(smartctl),
            Box::new(FakeHost),
        )
        .unwrap()
    }

    fn family<'a>(families: &'a [MetricFamily], name: &str) -> &'a MetricFamily {
        families
            .iter()
            .find(|f| f.get_name() == name)
            .unwrap_or_else(|| panic!("family {name} not found"))
    }

    fn labels_of(metric: &prometheus::proto::Metric) -> HashMap<String, String> {
        metric
            .get_label()
            .iter()
            .map(|l| (l.get_name().to_string(), l.get_value().to_string()))
            .collect()
    }

    #[test]
    fn describe_is_pure_and_covers_all_series() {
        let c = collector(&[], FakeSmartctl::failing());
        // Callable before any collection, ten attributes plus the error
        // series.
        assert_eq!(c.desc().len(), 11);
        assert_eq!(c.desc().len(), 11);
    }

    #[test]
    fn full_report_yields_labeled_samples() {
        let c = collector(&["/dev/sda"], FakeSmartctl::single("/dev/sda", FULL_REPORT));
        let families = c.collect();

        let hours = family(&families, "smartctl_power_on_hours");
        assert_eq!(hours.get_metric().len(), 1);
        let sample = &hours.get_metric()[0];
        assert_eq!(sample.get_gauge().value(), 12345.0);

        let labels = labels_of(sample);
        assert_eq!(labels["device"], "/dev/sda");
        assert_eq!(labels["serial"], "XYZ123");
        assert_eq!(labels["model"], "FastSSD");
        assert_eq!(labels["host"], "testhost");

        // All ten attribute families are present, no error family.
        assert_eq!(families.len(), TRACKED_ATTRIBUTES.len());
        assert!(!families
            .iter()
            .any(|f| f.get_name() == "smartctl_scrape_error"));
    }

    #[test]
    fn missing_attribute_is_sampled_as_zero() {
        let c = collector(&["/dev/sda"], FakeSmartctl::single("/dev/sda", FULL_REPORT));
        let families = c.collect();

        // Id 197 is not in the report, but the series is still emitted.
        let pending = family(&families, "smartctl_Current_Pending_Sector");
        assert_eq!(pending.get_metric().len(), 1);
        assert_eq!(pending.get_metric()[0].get_gauge().value(), 0.0);
    }

    #[test]
    fn report_without_serial_is_silently_skipped() {
        let no_serial = "Device Model:     FastSSD\n\
                         9 Power_On_Hours 0x0032 100 100 000 Old_age Always - 12345\n";
        let c = collector(&["/dev/sda"], FakeSmartctl::single("/dev/sda", no_serial));
        assert!(c.collect().is_empty());
    }

    #[test]
    fn probe_failure_yields_single_error_sample() {
        let c = collector(&["/dev/sda"], FakeSmartctl::failing());
        let families = c.collect();

        assert_eq!(families.len(), 1);
        let errors = family(&families, "smartctl_scrape_error");
        assert_eq!(errors.get_metric().len(), 1);
        let sample = &errors.get_metric()[0];
        assert_eq!(sample.get_gauge().value(), 1.0);
        assert_eq!(labels_of(sample)["device"], "/dev/sda");
    }

    #[test]
    fn unconfigured_collector_is_inert() {
        let c = collector(&[], FakeSmartctl::failing());
        assert!(c.collect().is_empty());
    }

    #[test]
    fn failing_device_does_not_block_healthy_one() {
        let c = collector(
            &["/dev/sda", "/dev/sdb"],
            FakeSmartctl::single("/dev/sda", FULL_REPORT),
        );
        let families = c.collect();

        let hours = family(&families, "smartctl_power_on_hours");
        assert_eq!(hours.get_metric().len(), 1);
        assert_eq!(labels_of(&hours.get_metric()[0])["device"], "/dev/sda");

        let errors = family(&families, "smartctl_scrape_error");
        assert_eq!(errors.get_metric().len(), 1);
        assert_eq!(labels_of(&errors.get_metric()[0])["device"], "/dev/sdb");
    }

    #[test]
    fn samples_do_not_leak_across_cycles() {
        let c = collector(&["/dev/sda"], FakeSmartctl::single("/dev/sda", FULL_REPORT));
        assert_eq!(c.collect().len(), TRACKED_ATTRIBUTES.len());
        // Same result on a fresh cycle, not doubled-up children.
        let families = c.collect();
        assert_eq!(families.len(), TRACKED_ATTRIBUTES.len());
        assert_eq!(
            family(&families, "smartctl_power_on_hours").get_metric().len(),
            1
        );
    }

    /// Fake smartctl whose first read of `/dev/sdb` parks until released,
    /// letting a second scrape overlap the first deterministically.
    struct ParkingSmartctl {
        parked_once: AtomicBool,
        entered: Mutex<Sender<()>>,
        release: Mutex<Receiver<()>>,
    }

    impl Smartctl for ParkingSmartctl {
        fn read_device(&self, device: &str) -> Result<String, ProbeError> {
            if device == "/dev/sdb" && !self.parked_once.swap(true, Ordering::SeqCst) {
                self.entered.lock().unwrap().send(()).unwrap();
                self.release.lock().unwrap().recv().unwrap();
            }
            Ok(FULL_REPORT.to_string())
        }
    }

    #[test]
    fn overlapping_scrapes_keep_their_own_samples() {
        let (entered_tx, entered_rx) = channel();
        let (release_tx, release_rx) = channel();

        let collector = Arc::new(
            SmartCollector::with_collaborators(
                vec!["/dev/sda".to_string(), "/dev/sdb".to_string()],
                Box::new(ParkingSmartctl {
                    parked_once: AtomicBool::new(false),
                    entered: Mutex::new(entered_tx),
                    release: Mutex::new(release_rx),
                }),
                Box::new(FakeHost),
            )
            .unwrap(),
        );

        let first = {
            let collector = Arc::clone(&collector);
            thread::spawn(move || collector.collect())
        };

        // The first scrape has read /dev/sda and is parked inside /dev/sdb.
        entered_rx.recv().unwrap();

        // A second scrape runs start to finish while the first is in flight.
        let second = collector.collect();

        release_tx.send(()).unwrap();
        let first = first.join().unwrap();

        // Both scrapes carry the samples of both devices; neither saw the
        // other's in-flight state.
        for families in [&first, &second] {
            let hours = family(families, "smartctl_power_on_hours");
            let devices: Vec<String> = hours
                .get_metric()
                .iter()
                .map(|m| labels_of(m)["device"].clone())
                .collect();
            assert!(devices.contains(&"/dev/sda".to_string()), "{devices:?}");
            assert!(devices.contains(&"/dev/sdb".to_string()), "{devices:?}");
        }
    }
}
