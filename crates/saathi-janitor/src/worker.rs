//! Background worker for continuous Janitor operation

use crate::{Janitor, JanitorConfig, JanitorError};
use saathi_intake::SessionStore;
use std::future::Future;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Background worker that sweeps a session store on a schedule
///
/// # Examples
///
/// ```no_run
/// use saathi_intake::SessionStore;
/// use saathi_janitor::{JanitorConfig, JanitorWorker};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let sessions = SessionStore::new();
///     let mut worker = JanitorWorker::new(JanitorConfig::default())?;
///
///     // Run until Ctrl+C
///     worker.run(sessions).await;
///     Ok(())
/// }
/// ```
pub struct JanitorWorker {
    janitor: Janitor,
    interval: Duration,
}

impl JanitorWorker {
    /// Create a new background worker with the given configuration
    pub fn new(config: JanitorConfig) -> Result<Self, JanitorError> {
        let interval = config.sweep_interval();
        Ok(Self {
            janitor: Janitor::new(config)?,
            interval,
        })
    }

    /// Create a worker with default configuration
    pub fn default_config() -> Self {
        Self {
            interval: JanitorConfig::default().sweep_interval(),
            janitor: Janitor::default_config(),
        }
    }

    /// The janitor driven by this worker
    pub fn janitor(&self) -> &Janitor {
        &self.janitor
    }

    /// Run until a shutdown signal (Ctrl+C) is received
    pub async fn run(&mut self, sessions: SessionStore) {
        self.run_until(sessions, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until `shutdown` completes
    pub async fn run_until<F>(&mut self, sessions: SessionStore, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        tracing::info!("Janitor worker started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::debug!("Starting sweep cycle");
                    self.janitor.sweep(&sessions);
                }
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received, stopping janitor");
                    break;
                }
            }
        }

        tracing::info!(
            "Janitor stopped. Final metrics:\n{}",
            self.janitor.metrics().summary()
        );
    }

    /// Run for a specific number of cycles (useful for testing)
    pub async fn run_cycles(&mut self, sessions: SessionStore, cycles: usize) {
        let mut ticker = interval(self.interval);

        tracing::info!(
            "Janitor worker started for {} cycles (interval: {:?})",
            cycles,
            self.interval
        );

        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Starting sweep cycle {}/{}", cycle + 1, cycles);
            let report = self.janitor.sweep(&sessions);
            tracing::debug!(
                "Sweep {}/{} completed: {} evicted, {} remaining",
                cycle + 1,
                cycles,
                report.evicted.len(),
                report.remaining
            );
        }
    }
}
