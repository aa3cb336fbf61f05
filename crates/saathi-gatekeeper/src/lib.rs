//! Saathi Gatekeeper
//!
//! Decides whether a record may leave the conversation.
//!
//! The Gatekeeper provides:
//! - Readiness evaluation (which required fields are still missing)
//! - Guarded submission to a [`RecordSink`](saathi_domain::traits::RecordSink)
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use saathi_domain::{FieldSchema, Record};
//! use saathi_gatekeeper::{Gatekeeper, ValidationStatus};
//!
//! let schema = Arc::new(FieldSchema::fir_default().unwrap());
//! let gatekeeper = Gatekeeper::new(schema);
//!
//! let readiness = gatekeeper.evaluate(&Record::new());
//! assert_eq!(readiness.status, ValidationStatus::Incomplete);
//! ```

#![warn(missing_docs)]

mod error;
mod validator;

pub use error::GatekeeperError;
pub use validator::{Gatekeeper, Readiness, ValidationStatus};
