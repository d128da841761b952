//! Daemon assembly and lifecycle management.
//!
//! Wires the in-memory scan store, the system tool runner, and the
//! broadcast hub into a [`ScanOrchestrator`], then runs until a
//! shutdown signal arrives. Shutdown cancels all running scans and
//! waits for their session tasks to finish, so in-flight tool
//! processes are terminated before the process exits.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use pentora_core::config::PentoraConfig;
use pentora_core::hub::BroadcastHub;
use pentora_core::metrics as metric_names;
use pentora_orchestrator::{MemoryScanStore, ScanOrchestrator};
use pentora_tool_runner::SystemToolRunner;

use crate::metrics_server;

/// Interval between uptime gauge updates.
const UPTIME_UPDATE_INTERVAL: Duration = Duration::from_secs(10);

/// The assembled daemon.
pub struct Daemon {
    orchestrator: ScanOrchestrator,
    start_time: Instant,
}

impl Daemon {
    /// Build the daemon from an already-loaded configuration.
    ///
    /// Installs the metrics recorder (when enabled) and wires all
    /// components. The configuration must already be validated.
    pub fn build_from_config(config: PentoraConfig) -> Result<Self> {
        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
            metrics::gauge!(
                metric_names::DAEMON_BUILD_INFO,
                "version" => env!("CARGO_PKG_VERSION")
            )
            .set(1.0);
        }

        let hub = BroadcastHub::with_capacity(config.scan.event_channel_capacity);
        let store = Arc::new(MemoryScanStore::new());
        let runner = Arc::new(SystemToolRunner::new());
        let orchestrator = ScanOrchestrator::new(config, store, runner, hub);

        Ok(Self {
            orchestrator,
            start_time: Instant::now(),
        })
    }

    /// The orchestrator this daemon drives. Exposed for the transport
    /// layer and for integration tests.
    pub fn orchestrator(&self) -> &ScanOrchestrator {
        &self.orchestrator
    }

    /// Run until a shutdown signal (SIGINT/SIGTERM) arrives.
    pub async fn run(&self) -> Result<()> {
        // Audit log of every broadcast event
        let (subscriber_id, mut events) = self.orchestrator.hub().subscribe();
        let audit_task = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                tracing::info!(
                    scan_id = event.scan_id(),
                    event_type = event.event_type(),
                    "scan event"
                );
            }
        });

        let start_time = self.start_time;
        let uptime_task = tokio::spawn(async move {
            loop {
                metrics::gauge!(metric_names::DAEMON_UPTIME_SECONDS)
                    .set(start_time.elapsed().as_secs_f64());
                tokio::time::sleep(UPTIME_UPDATE_INTERVAL).await;
            }
        });

        tracing::info!("pentora-daemon running");
        wait_for_shutdown_signal().await?;
        tracing::info!("shutdown signal received");

        self.orchestrator.shutdown().await;
        self.orchestrator.hub().unsubscribe(subscriber_id);
        audit_task.abort();
        uptime_task.abort();

        tracing::info!("pentora-daemon shut down");
        Ok(())
    }
}

async fn wait_for_shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut term = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;
    Ok(())
}
