//! Printvend Daemon - Main Entry Point
//!
//! Composition root: wires the SQLite adapters, the core services, the
//! JSON-RPC server, and the offline sweeper together.

mod gateway;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gateway::ReceiptOrderGateway;
use printvend_api_rpc::{RpcServer, RpcServerConfig};
use printvend_core::application::{
    shutdown_channel, EventHub, JobService, MachineService, OfflineSweeper, PaymentService,
    SessionRegistry,
};
use printvend_core::port::id_provider::UuidProvider;
use printvend_core::port::time_provider::SystemTimeProvider;
use printvend_infra_sqlite::{
    create_pool, run_migrations, SqliteJobRepository, SqliteMachineRepository,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DB_PATH: &str = "~/.printvend/printvend.db";
const DEFAULT_RPC_PORT: u16 = 9631;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;
const DEFAULT_OFFLINE_AFTER_SECS: u64 = 90;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format = std::env::var("PRINTVEND_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("printvend=info"))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Printvend daemon v{} starting...", VERSION);

    // 1.1. Initialize OpenTelemetry (optional)
    if let Err(e) = telemetry::init_telemetry() {
        tracing::warn!(error = ?e, "Failed to initialize OpenTelemetry (continuing without it)");
    }

    // 2. Load configuration
    let db_path = std::env::var("PRINTVEND_DB_PATH")
        .unwrap_or_else(|_| shellexpand::tilde(DEFAULT_DB_PATH).into_owned());

    let rpc_port: u16 = std::env::var("PRINTVEND_RPC_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_RPC_PORT);

    // The HMAC secret shared with the payment processor; refusing to start
    // without it beats silently accepting unverifiable confirmations
    let payment_secret = std::env::var("PRINTVEND_PAYMENT_SECRET")
        .context("PRINTVEND_PAYMENT_SECRET must be set")?;

    let base_url = std::env::var("PRINTVEND_BASE_URL")
        .unwrap_or_else(|_| format!("http://127.0.0.1:{}", rpc_port));

    let sweep_interval = Duration::from_secs(
        std::env::var("PRINTVEND_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS),
    );

    let offline_after = Duration::from_secs(
        std::env::var("PRINTVEND_OFFLINE_AFTER_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_OFFLINE_AFTER_SECS),
    );

    info!(db_path = %db_path, "Initializing database...");

    // 3. Initialize database
    let pool = create_pool(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);
    let job_repo = Arc::new(SqliteJobRepository::new(pool.clone()));
    let machine_repo = Arc::new(SqliteMachineRepository::new(pool.clone()));

    let events = Arc::new(EventHub::new());
    let sessions = Arc::new(SessionRegistry::new());
    let payment_gateway = Arc::new(ReceiptOrderGateway::new(id_provider.clone()));

    let job_service = Arc::new(JobService::new(
        job_repo.clone(),
        machine_repo.clone(),
        id_provider.clone(),
        time_provider.clone(),
        events.clone(),
    ));

    let machine_service = Arc::new(MachineService::new(
        machine_repo.clone(),
        sessions.clone(),
        id_provider.clone(),
        time_provider.clone(),
        events.clone(),
        base_url,
    ));

    let payment_service = Arc::new(PaymentService::new(
        job_repo.clone(),
        payment_gateway,
        time_provider.clone(),
        events.clone(),
        payment_secret,
    ));

    // 5. Start JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_config = RpcServerConfig {
        port: rpc_port,
        ..Default::default()
    };
    let rpc_server = RpcServer::new(
        rpc_config,
        job_service,
        machine_service,
        payment_service,
        events.clone(),
        id_provider,
    );
    let (rpc_handle, rpc_addr) = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(addr = %rpc_addr, "JSON-RPC server listening");

    // 6. Start the offline sweeper
    info!("Starting offline sweeper...");
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let sweeper = OfflineSweeper::new(
        machine_repo,
        time_provider,
        events,
        sweep_interval,
        offline_after,
    );

    let sweeper_handle = tokio::spawn(async move {
        sweeper.run(shutdown_rx).await;
    });

    info!("System ready. Waiting for connections...");
    info!("Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown
    shutdown_tx.shutdown();
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    let _ = tokio::time::timeout(Duration::from_secs(5), sweeper_handle).await;

    info!("Shutdown complete.");

    Ok(())
}
