// ABOUTME: Command-line entry point for the health sync daemon
// ABOUTME: Runs the background scheduler, triggers a manual sync, or reports scheduler status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Health Sync Binary
//!
//! `run` keeps the process alive with the recurring sync registered,
//! `sync-now` requests permissions and performs the manual "Get Health Data"
//! action once, and `status` reports whether registration would go through
//! with the current settings. Neither `sync-now` nor `status` registers the
//! background task.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use health_sync::app::HealthSyncApp;
use health_sync::config::SyncConfig;
use health_sync::delivery::{initialize_shared_client, DeliveryClient};
use health_sync::health_source::JsonExportSource;
use health_sync::logging::LoggingConfig;
use health_sync::scheduler::{global, SchedulingSubstrate, TaskOptions, TokioSubstrate};
use serde_json::json;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "health-sync",
    about = "Health Sync - periodically delivers on-device health records to an ingestion endpoint"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Ingestion endpoint override
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Background interval override, in seconds
    #[arg(long, global = true)]
    interval_secs: Option<u64>,

    /// JSON health export file to read records from
    #[arg(long, global = true)]
    export_path: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Register the background sync and request permissions, then wait for Ctrl-C
    Run,
    /// Request permissions and run one manual sync ("Get Health Data")
    SyncNow,
    /// Print substrate status and whether registration would succeed, without registering
    Status,
}

impl Cli {
    fn apply_overrides(&self, config: &mut SyncConfig) -> Result<()> {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint_url.clone_from(endpoint);
        }
        if let Some(interval_secs) = self.interval_secs {
            config.schedule.minimum_interval_secs = interval_secs;
        }
        if let Some(export_path) = &self.export_path {
            config.export_path = Some(export_path.clone());
        }
        config.validate()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = SyncConfig::from_env()?;
    cli.apply_overrides(&mut config)?;

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    logging.init()?;
    info!("{}", config.summary());

    initialize_shared_client(config.http);

    let export_path = config
        .export_path
        .clone()
        .context("No health export configured; set HEALTH_SYNC_EXPORT_PATH or pass --export-path")?;

    let substrate = Arc::new(TokioSubstrate::new(config.substrate_status));
    let app = HealthSyncApp::new(
        &config,
        Arc::new(JsonExportSource::new(export_path)),
        Arc::clone(&substrate) as Arc<dyn SchedulingSubstrate>,
        DeliveryClient::new(config.endpoint_url.clone()),
    );
    global::install(Arc::clone(app.scheduler()))?;

    match cli.command {
        Command::Run => {
            app.start().await;
            info!("Health sync running; press Ctrl-C to stop");
            signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;
            info!("Shutdown signal received");
        }
        Command::SyncNow => {
            if let Err(e) = app.request_permissions().await {
                warn!(error = %e, "Permission request failed");
            }
            let report = app.get_health_data().await;
            match &report.error {
                Some(e) => println!("{} ({e})", report.outcome),
                None => println!("{}", report.outcome),
            }
        }
        Command::Status => {
            let status = substrate.status().await;
            let registrable = app.scheduler().can_register().await;
            let summary = json!({
                "task_id": app.scheduler().task_id(),
                "substrate_status": status,
                "registration_possible": registrable,
                "state": app.scheduler().state(),
                "task_options": TaskOptions::from(&config.schedule),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    substrate.shutdown();
    Ok(())
}
