// Host polling loop around the sweep runner
//
// The runner's contract is "one sweep per trigger"; cadence lives here. In
// the real platform the trigger comes from the surrounding scheduler, so
// this loop is deliberately thin: tick, sweep, repeat, until shutdown.

use crate::runner::{JobStatus, ScheduleRunner};
use std::time::Duration;
use tokio::time::{interval, sleep};
use tracing::info;

/// Configuration for the agent loop
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Seconds between sweep triggers
    pub poll_interval_seconds: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 60,
        }
    }
}

/// Triggers sweeps on a fixed interval with graceful shutdown
pub struct Agent {
    config: AgentConfig,
    runner: ScheduleRunner,
    shutdown_tx: tokio::sync::broadcast::Sender<()>,
}

impl Agent {
    pub fn new(config: AgentConfig, runner: ScheduleRunner) -> Self {
        let (shutdown_tx, _shutdown_rx) = tokio::sync::broadcast::channel(1);
        Self {
            config,
            runner,
            shutdown_tx,
        }
    }

    pub fn shutdown_receiver(&self) -> tokio::sync::broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Run the trigger loop until a shutdown signal arrives
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(
            poll_interval_seconds = self.config.poll_interval_seconds,
            "Starting schedule agent loop"
        );

        let mut poll_interval = interval(Duration::from_secs(self.config.poll_interval_seconds));
        let mut shutdown_rx = self.shutdown_receiver();

        loop {
            tokio::select! {
                _ = poll_interval.tick() => {
                    let status = JobStatus::schedule();
                    self.runner.run(Some(&status)).await;
                    info!(
                        total = status.total(),
                        processed = status.processed(),
                        failed = status.failed(),
                        "Sweep completed"
                    );
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping agent");
                    break;
                }
            }
        }

        info!("Schedule agent loop stopped");
        Ok(())
    }

    /// Stop the loop gracefully
    pub async fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let _ = self.shutdown_tx.send(());

        // Give the in-flight sweep a moment to finish its current descriptor
        sleep(Duration::from_secs(1)).await;
        Ok(())
    }
}
