//! Configuration management for smartctl-exporter.
//!
//! This module handles loading, merging, and validating configuration from
//! files and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat};
use crate::probe::DEFAULT_SMARTCTL_BIN;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9167;
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Exporter configuration. Every field is optional so file and CLI layers
/// can be merged; accessors in main fall back to the defaults above.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,
    #[serde(alias = "metrics-path")]
    pub metrics_path: Option<String>,

    // Devices to probe on every scrape. An empty list keeps the exporter
    // running but inert.
    pub devices: Option<Vec<String>>,

    // Path to the smartctl binary
    #[serde(alias = "smartctl-bin")]
    pub smartctl_bin: Option<String>,

    // Logging
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_PORT),
            metrics_path: Some(DEFAULT_METRICS_PATH.to_string()),
            devices: None,
            smartctl_bin: Some(DEFAULT_SMARTCTL_BIN.to_string()),
            log_level: Some("info".into()),
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let path = cfg.metrics_path.as_deref().unwrap_or(DEFAULT_METRICS_PATH);
    if !path.starts_with('/') {
        return Err(format!("metrics_path must start with '/', got '{}'", path).into());
    }
    if path == "/" {
        return Err("metrics_path must not be '/', the root redirects to the metrics path".into());
    }

    if let Some(devices) = &cfg.devices {
        if devices.iter().any(|d| d.trim().is_empty()) {
            return Err("devices must not contain empty entries".into());
        }
    }

    if let Some(bin) = cfg.smartctl_bin.as_deref() {
        if bin.trim().is_empty() {
            return Err("smartctl_bin must not be empty".into());
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref().and_then(|p| p.to_str()))?
    };

    // Override with CLI args
    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }

    // Only override port if the user supplied it on the CLI.
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }

    if let Some(path) = &args.metrics_path {
        config.metrics_path = Some(path.clone());
    }

    if !args.devices.is_empty() {
        config.devices = Some(args.devices.clone());
    }

    if let Some(bin) = &args.smartctl_bin {
        config.smartctl_bin = Some(bin.clone());
    }

    if let Some(level) = &args.log_level {
        config.log_level = Some(format!("{level:?}").to_lowercase());
    }

    Ok(config)
}

/// Maps the merged log level onto a tracing level. Unknown values fall
/// back to info.
pub fn effective_log_level(cfg: &Config) -> Level {
    match cfg
        .log_level
        .as_deref()
        .unwrap_or("info")
        .to_ascii_lowercase()
        .as_str()
    {
        "off" | "error" => Level::ERROR,
        "warn" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    }
}

/// Enhanced configuration loading with multiple format support
pub fn load_config(path: Option<&str>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = if let Some(p) = path {
        PathBuf::from(p)
    } else {
        // Try default locations
        let defaults = [
            "/etc/smartctl-exporter/config.yaml",
            "/etc/smartctl-exporter/config.yml",
            "/etc/smartctl-exporter/config.json",
            "./smartctl-exporter.yaml",
            "./smartctl-exporter.yml",
            "./smartctl-exporter.json",
        ];

        defaults
            .iter()
            .find(|p| Path::new(p).exists())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(""))
    };

    if !path.exists() || path.to_string_lossy().is_empty() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };

    println!("{output}");
    Ok(())
}
