//! Metrics collection for Janitor operations

use serde::Serialize;

/// Counters accumulated across sweeps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JanitorMetrics {
    /// Total sweep iterations completed
    pub sweep_count: usize,

    /// Sessions removed for inactivity
    pub sessions_evicted: usize,

    /// Sessions that would have been removed in dry-run mode
    pub sessions_flagged: usize,

    /// Highest number of live sessions seen at a sweep
    pub peak_sessions: usize,

    /// Unix timestamp of the last sweep
    pub last_sweep_at: Option<u64>,
}

impl JanitorMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sweep cycle
    pub fn record_sweep(&mut self, at: u64, live_before: usize, evicted: usize, dry_run: bool) {
        self.sweep_count += 1;
        self.last_sweep_at = Some(at);
        self.peak_sessions = self.peak_sessions.max(live_before);
        if dry_run {
            self.sessions_flagged += evicted;
        } else {
            self.sessions_evicted += evicted;
        }
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Janitor Metrics Summary".to_string(),
            "======================".to_string(),
            format!("Sweep cycles: {}", self.sweep_count),
            format!("Sessions evicted: {}", self.sessions_evicted),
            format!("Peak live sessions: {}", self.peak_sessions),
        ];
        if self.sessions_flagged > 0 {
            lines.push(format!("Flagged (dry run): {}", self.sessions_flagged));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sweep() {
        let mut metrics = JanitorMetrics::new();
        metrics.record_sweep(100, 5, 2, false);
        metrics.record_sweep(160, 3, 0, false);

        assert_eq!(metrics.sweep_count, 2);
        assert_eq!(metrics.sessions_evicted, 2);
        assert_eq!(metrics.peak_sessions, 5);
        assert_eq!(metrics.last_sweep_at, Some(160));
    }

    #[test]
    fn test_dry_run_counts_separately() {
        let mut metrics = JanitorMetrics::new();
        metrics.record_sweep(100, 4, 3, true);
        assert_eq!(metrics.sessions_evicted, 0);
        assert_eq!(metrics.sessions_flagged, 3);
        assert!(metrics.summary().contains("Flagged (dry run): 3"));
    }

    #[test]
    fn test_reset() {
        let mut metrics = JanitorMetrics::new();
        metrics.record_sweep(100, 4, 3, false);
        metrics.reset();
        assert_eq!(metrics, JanitorMetrics::default());
    }
}
