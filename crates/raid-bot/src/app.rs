//! Process bootstrap and shutdown
//!
//! Startup order: settings, store, platform bridge, queue, context, worker,
//! maintenance scheduler, HTTP server. On Ctrl-C the server stops accepting
//! requests, then the worker finishes the task in flight and exits.

use std::sync::Arc;

use raid_common::{AppConfig, AppError};
use raid_service::{
    CommandWorker, MaintenanceScheduler, ServiceContextBuilder, ServiceSettings, TaskQueue,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::bridge::BridgePlatform;
use crate::server::{create_app, run_server};
use crate::state::AppState;

pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let settings = ServiceSettings::from_config(&config)?;
    let store = raid_store::open_store(&config.store).await?;
    let platform = Arc::new(BridgePlatform::from_config(&config.platform)?);
    info!(bridge = %config.platform.bridge_url, "Platform bridge configured");

    let (queue, receiver) = TaskQueue::new();
    let cancel = CancellationToken::new();

    let ctx = ServiceContextBuilder::default()
        .store(store)
        .platform(platform)
        .queue(queue)
        .settings(settings)
        .build()
        .map_err(|e| AppError::internal(anyhow::anyhow!(e)))?;
    let ctx = Arc::new(ctx);

    let worker = CommandWorker::new(receiver, cancel.clone());
    let stats = worker.stats();
    let worker = worker.spawn();

    let scheduler = MaintenanceScheduler::new(
        Arc::clone(&ctx),
        config.schedule.maintenance_interval(),
        config.schedule.maintenance_mode,
        cancel.clone(),
    )
    .spawn();

    let address = config.server.address();
    let state = AppState::new(ctx, Arc::new(config));
    let served = run_server(create_app(state), &address, shutdown_signal()).await;

    info!("Shutting down");
    cancel.cancel();
    if let Err(e) = worker.await {
        warn!(error = %e, "Command worker ended abnormally");
    }
    if let Err(e) = scheduler.await {
        warn!(error = %e, "Maintenance scheduler ended abnormally");
    }
    info!(
        completed = stats.completed(),
        failed = stats.failed(),
        panicked = stats.panicked(),
        "Raid bot stopped"
    );

    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
