//! Configuration for Janitor operations
//!
//! Defines how long a session may sit idle and how often the sweep runs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Janitor service
///
/// # Examples
///
/// ```
/// use saathi_janitor::JanitorConfig;
///
/// // Default configuration (balanced)
/// let config = JanitorConfig::default();
/// assert_eq!(config.idle_timeout_secs, 1800);
///
/// // Aggressive cleanup
/// let config = JanitorConfig::aggressive();
/// assert_eq!(config.idle_timeout_secs, 600);
///
/// // Lenient cleanup
/// let config = JanitorConfig::lenient();
/// assert_eq!(config.idle_timeout_secs, 7200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JanitorConfig {
    /// Seconds without activity before a session is evicted
    /// Default: 30 minutes
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// How often to run the sweep cycle (in seconds)
    /// Default: every minute
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Dry-run mode: log what would be evicted without evicting
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,
}

fn default_idle_timeout_secs() -> u64 {
    1800
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for JanitorConfig {
    /// Balanced policy: 30 minute idle timeout, sweep every minute
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            dry_run: false,
        }
    }
}

impl JanitorConfig {
    /// Aggressive cleanup: 10 minute idle timeout, sweep every 30 seconds
    ///
    /// Suitable for busy deployments where memory is at a premium.
    pub fn aggressive() -> Self {
        Self {
            idle_timeout_secs: 600,
            sweep_interval_secs: 30,
            dry_run: false,
        }
    }

    /// Lenient cleanup: 2 hour idle timeout, sweep every 5 minutes
    ///
    /// Suitable for development or users who fill the form slowly.
    pub fn lenient() -> Self {
        Self {
            idle_timeout_secs: 7200,
            sweep_interval_secs: 300,
            dry_run: false,
        }
    }

    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.sweep_interval_secs == 0 {
            return Err("sweep_interval_secs must be greater than 0".to_string());
        }
        if self.idle_timeout_secs == 0 {
            return Err("idle_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}
