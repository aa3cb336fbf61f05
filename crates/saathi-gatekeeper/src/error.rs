//! Gatekeeper error types

use thiserror::Error;

/// Errors that can occur when submitting a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatekeeperError {
    /// Required fields are still missing; nothing was sent to the sink
    #[error("Record is incomplete, missing: {}", .missing.join(", "))]
    Incomplete {
        /// Missing required fields in schema order
        missing: Vec<String>,
    },

    /// The sink rejected the record
    #[error("{0}")]
    Persistence(String),
}
