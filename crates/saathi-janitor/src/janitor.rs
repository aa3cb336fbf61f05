//! Core Janitor implementation: idle session eviction

use crate::{JanitorConfig, JanitorError, JanitorMetrics};
use saathi_domain::unix_timestamp;
use saathi_intake::SessionStore;
use tracing::{debug, info};

/// Outcome of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Sessions removed (or, in dry-run mode, that would be removed)
    pub evicted: Vec<String>,

    /// Sessions still live after the sweep
    pub remaining: usize,
}

/// Removes sessions that have been idle too long
pub struct Janitor {
    config: JanitorConfig,
    metrics: JanitorMetrics,
}

impl Janitor {
    /// Create a new Janitor
    pub fn new(config: JanitorConfig) -> Result<Self, JanitorError> {
        config.validate().map_err(JanitorError::Config)?;
        Ok(Self {
            config,
            metrics: JanitorMetrics::new(),
        })
    }

    /// Create a Janitor with default configuration
    pub fn default_config() -> Self {
        Self {
            config: JanitorConfig::default(),
            metrics: JanitorMetrics::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &JanitorConfig {
        &self.config
    }

    /// Counters accumulated so far
    pub fn metrics(&self) -> &JanitorMetrics {
        &self.metrics
    }

    /// Reset accumulated counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Sweep as of the current time
    pub fn sweep(&mut self, sessions: &SessionStore) -> SweepReport {
        self.sweep_at(sessions, unix_timestamp())
    }

    /// Sweep as of `now` (unix seconds)
    ///
    /// Sessions with a turn in flight are never evicted.
    pub fn sweep_at(&mut self, sessions: &SessionStore, now: u64) -> SweepReport {
        let live_before = sessions.len();
        let idle = self.config.idle_timeout_secs;

        let evicted = if self.config.dry_run {
            let candidates = sessions.idle_candidates(idle, now);
            for id in &candidates {
                info!("[dry run] Would evict idle session {}", id);
            }
            candidates
        } else {
            sessions.evict_idle(idle, now)
        };

        self.metrics
            .record_sweep(now, live_before, evicted.len(), self.config.dry_run);

        if evicted.is_empty() {
            debug!("Sweep found no idle sessions ({} live)", live_before);
        } else if !self.config.dry_run {
            info!("Evicted {} idle sessions", evicted.len());
        }

        SweepReport {
            remaining: sessions.len(),
            evicted,
        }
    }
}
