//! Maintenance scheduler - periodic reconciliation of every configured guild
//!
//! Sweeps once at startup and then every interval. In direct mode the sweep
//! runs on the scheduler's own task, concurrently with queued commands; in
//! queued mode it is submitted to the task queue like any command.

use std::sync::Arc;
use std::time::Duration;

use raid_common::MaintenanceMode;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::services::{PlacementService, ServiceContext};

pub struct MaintenanceScheduler {
    ctx: Arc<ServiceContext>,
    interval: Duration,
    mode: MaintenanceMode,
    cancel: CancellationToken,
}

impl MaintenanceScheduler {
    pub fn new(
        ctx: Arc<ServiceContext>,
        interval: Duration,
        mode: MaintenanceMode,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            ctx,
            interval,
            mode,
            cancel,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Sweep, then sleep, until cancelled
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), mode = ?self.mode, "Maintenance scheduler started");

        loop {
            self.tick().await;

            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("Maintenance scheduler stopped");
    }

    #[instrument(skip(self))]
    async fn tick(&self) {
        match self.mode {
            MaintenanceMode::Direct => sweep(&self.ctx).await,
            MaintenanceMode::Queued => {
                let ctx = Arc::clone(&self.ctx);
                let submitted = self.ctx.queue().submit("maintenance", move || async move {
                    sweep(&ctx).await;
                    Ok(())
                });
                if let Err(e) = submitted {
                    error!(error = %e, "Background maintenance failed");
                }
            }
        }
    }
}

/// One sweep over all guilds; failures are logged, never returned
pub async fn sweep(ctx: &ServiceContext) {
    match PlacementService::new(ctx).sweep_all().await {
        Ok(swept) => info!(guilds = swept, "Maintenance sweep finished"),
        Err(e) => error!(error = %e, "Background maintenance failed"),
    }
}
