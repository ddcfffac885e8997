//! External collaborators of the collector: smartctl invocation and
//! hostname resolution.
//!
//! Both are behind traits so the collection logic can be exercised in tests
//! without a real smartctl binary or a real host identity.

use std::process::Command;

use thiserror::Error;

/// Default name of the diagnostic binary, resolved via `PATH`.
pub const DEFAULT_SMARTCTL_BIN: &str = "smartctl";

/// Errors from invoking the diagnostic utility.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The binary could not be launched at all.
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The binary ran but exited non-zero. smartctl uses several non-zero
    /// codes for predictive-failure conditions; all of them fail the cycle.
    #[error("{command} exited with {status}")]
    NonZeroExit {
        command: String,
        status: std::process::ExitStatus,
        /// Combined stdout+stderr, kept for operator diagnosis.
        output: String,
    },
}

/// Capability for reading a SMART report from a block device.
pub trait Smartctl: Send + Sync {
    /// Runs the diagnostic utility against `device` and returns its combined
    /// stdout+stderr on success.
    fn read_device(&self, device: &str) -> Result<String, ProbeError>;
}

/// Production [`Smartctl`] implementation running `<bin> -iA <device>`.
pub struct SystemSmartctl {
    binary: String,
}

impl SystemSmartctl {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for SystemSmartctl {
    fn default() -> Self {
        Self::new(DEFAULT_SMARTCTL_BIN)
    }
}

impl Smartctl for SystemSmartctl {
    fn read_device(&self, device: &str) -> Result<String, ProbeError> {
        let command = format!("{} -iA {}", self.binary, device);

        let result = Command::new(&self.binary)
            .args(["-iA", device])
            .output()
            .map_err(|source| ProbeError::Spawn {
                command: command.clone(),
                source,
            })?;

        let mut output = String::from_utf8_lossy(&result.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&result.stderr));

        if !result.status.success() {
            return Err(ProbeError::NonZeroExit {
                command,
                status: result.status,
                output,
            });
        }

        Ok(output)
    }
}

/// Capability for resolving the local host identifier used as the `host`
/// label on every sample.
pub trait HostInfo: Send + Sync {
    fn hostname(&self) -> String;
}

/// Production [`HostInfo`] implementation reading the kernel hostname.
pub struct SysHostInfo;

impl HostInfo for SysHostInfo {
    fn hostname(&self) -> String {
        std::fs::read_to_string("/proc/sys/kernel/hostname")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_failure_is_reported() {
        let probe = SystemSmartctl::new("/nonexistent/smartctl-test-binary");
        let err = probe.read_device("/dev/sda").unwrap_err();
        assert!(matches!(err, ProbeError::Spawn { .. }));
        assert!(err.to_string().contains("/nonexistent/smartctl-test-binary"));
    }

    #[test]
    fn sys_hostname_is_nonempty() {
        assert!(!SysHostInfo.hostname().is_empty());
    }
}
