//! CLI arguments and subcommands for smartctl-exporter.
//!
//! This module defines the command-line interface structure using the clap
//! library, including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "smartctl-exporter",
    about = "Prometheus exporter for SMART disk-health attributes",
    long_about = "Prometheus exporter for SMART disk-health attributes.\n\n\
                  Invokes smartctl against the configured block devices on every scrape, \
                  parses the attribute report and exposes power-on hours, reallocated \
                  sectors, temperature, LBA counters and other health attributes as \
                  labeled gauges.",
    author = "Michael Moll <exporter@herakles.now> - Herakles",
    version = "0.1.0",
    propagate_version = true,
    after_help = "Project: https://github.com/cansp-dev/smartctl-exporter — Support: exporter@herakles.now"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// URL path the metrics are served under
    #[arg(long = "path")]
    pub metrics_path: Option<String>,

    /// Block device to probe (repeatable, e.g. -d /dev/sda -d /dev/sdb)
    #[arg(short = 'd', long = "device")]
    pub devices: Vec<String>,

    /// Path to the smartctl binary
    #[arg(long)]
    pub smartctl_bin: Option<String>,

    /// Log level (overrides the config file value)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe the configured devices once and print the parsed attributes
    Check {
        /// Also print the raw smartctl report per device
        #[arg(long)]
        verbose: bool,
    },
}
