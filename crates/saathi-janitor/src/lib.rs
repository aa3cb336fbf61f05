//! Saathi Janitor
//!
//! Background maintenance that evicts intake sessions left idle.
//!
//! # Overview
//!
//! Sessions live in memory until they are closed. Users often walk away
//! half-way through a report, so the Janitor periodically removes sessions
//! that have seen no activity for `idle_timeout_secs`. A session with a turn
//! in flight is never evicted.
//!
//! # Usage
//!
//! ## One-time Sweep
//!
//! ```
//! use saathi_intake::SessionStore;
//! use saathi_janitor::Janitor;
//!
//! let sessions = SessionStore::new();
//! let mut janitor = Janitor::default_config();
//!
//! let report = janitor.sweep(&sessions);
//! println!("{} evicted, {} live", report.evicted.len(), report.remaining);
//! println!("{}", janitor.metrics().summary());
//! ```
//!
//! ## Background Worker
//!
//! ```no_run
//! use saathi_intake::SessionStore;
//! use saathi_janitor::{JanitorConfig, JanitorWorker};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sessions = SessionStore::new();
//! let mut worker = JanitorWorker::new(JanitorConfig::aggressive())?;
//! tokio::spawn(async move { worker.run(sessions).await });
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [janitor]
//! idle_timeout_secs = 1800
//! sweep_interval_secs = 60
//! dry_run = false
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod janitor;
mod metrics;
mod worker;

pub use config::JanitorConfig;
pub use error::JanitorError;
pub use janitor::{Janitor, SweepReport};
pub use metrics::JanitorMetrics;
pub use worker::JanitorWorker;
