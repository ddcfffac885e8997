//! smartctl-exporter - version 0.1.0
//!
//! Prometheus exporter for SMART disk-health attributes with tracing logging.
//! This is the main entry point that initializes the server and handles
//! subcommands.

use axum::{routing::get, Router};
use clap::Parser;
use prometheus::{Gauge, Registry};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info, warn};

use smartctl_exporter::cli::{Args, Commands};
use smartctl_exporter::collector::SmartCollector;
use smartctl_exporter::commands::command_check;
use smartctl_exporter::config::{
    effective_log_level, resolve_config, show_config, validate_effective_config, Config,
    DEFAULT_BIND_ADDR, DEFAULT_METRICS_PATH, DEFAULT_PORT,
};
use smartctl_exporter::handlers::{metrics_handler, root_handler};
use smartctl_exporter::probe::DEFAULT_SMARTCTL_BIN;
use smartctl_exporter::state::AppState;

/// Initializes tracing logging subsystem with the merged log level
/// (CLI over config file over default).
fn setup_logging(config: &Config) {
    let log_level = effective_log_level(config);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Logging initialized with level: {}", log_level);
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    if args.check_config {
        if let Err(e) = validate_effective_config(&config) {
            eprintln!("❌ Configuration invalid: {}", e);
            std::process::exit(1);
        }
        println!("✅ Configuration is valid");
        return Ok(());
    }

    if args.show_config {
        return show_config(&config, args.config_format);
    }

    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }

    setup_logging(&config);

    // Handle subcommands
    if let Some(command) = &args.command {
        return match command {
            Commands::Check { verbose } => command_check(*verbose, &config).map_err(Into::into),
        };
    }

    info!("Starting smartctl-exporter");

    let bind_ip_str = config.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
    let port = config.port.unwrap_or(DEFAULT_PORT);
    let metrics_path = config
        .metrics_path
        .clone()
        .unwrap_or_else(|| DEFAULT_METRICS_PATH.to_string());

    // Initialize Prometheus metrics registry
    let registry = Registry::new();
    debug!("Prometheus registry initialized");

    let devices = config.devices.clone().unwrap_or_default();
    if devices.is_empty() {
        warn!("No devices configured - the metrics page will only carry exporter self-metrics");
    } else {
        info!("Collecting SMART attributes for: {}", devices.join(", "));
    }

    let collector = SmartCollector::new(
        devices,
        config
            .smartctl_bin
            .as_deref()
            .unwrap_or(DEFAULT_SMARTCTL_BIN),
    )?;
    registry.register(Box::new(collector))?;

    let scrape_duration = Gauge::new(
        "smartctl_exporter_scrape_duration_seconds",
        "Time spent serving the metrics request (including smartctl invocations)",
    )?;
    registry.register(Box::new(scrape_duration.clone()))?;

    debug!("All metrics registered successfully");

    let state = Arc::new(AppState {
        registry,
        metrics_path: metrics_path.clone(),
        scrape_duration,
    });

    // Setup graceful shutdown signal handlers
    let shutdown_signal = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down gracefully...");
            }
        }
    };

    // Configure HTTP server routes
    let addr: SocketAddr = format!("{}:{}", bind_ip_str, port).parse()?;

    let app = Router::new()
        .route("/", get(root_handler))
        .route(&metrics_path, get(metrics_handler))
        .with_state(state.clone());

    let listener = TcpListener::bind(addr).await?;
    info!(
        "smartctl-exporter listening on http://{}:{}{}",
        bind_ip_str, port, metrics_path
    );

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e.into());
            }
        }
        _ = shutdown_signal => {
            info!("Shutdown signal received, exiting...");
        }
    }

    info!("smartctl-exporter stopped gracefully");
    Ok(())
}
