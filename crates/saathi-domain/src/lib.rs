//! Saathi Domain Layer
//!
//! This crate holds the core model of the FIR intake assistant: the field
//! schema, the slot-filled record, the conversation log, and the trait
//! boundaries that the infrastructure crates implement.
//!
//! ## Key Concepts
//!
//! - **Field Schema**: the typed set of fields the assistant collects, split into
//!   required and optional groups, in declaration order
//! - **Record**: the partially filled report for one session, updated only
//!   through the monotonic merge rule
//! - **Turn Log**: the append-only conversation for one session
//! - **Completeness**: which required fields are still missing
//!
//! ## Architecture
//!
//! - Pure business logic, no I/O beyond reading a schema file
//! - Dependencies limited to serde (wire shapes), thiserror and uuid
//! - Infrastructure implementations live in other crates
//!
//! ## Example
//!
//! ```
//! use saathi_domain::{FieldPatch, FieldSchema, Record, missing_fields};
//!
//! let schema = FieldSchema::from_json(
//!     r#"{"required_fields": {"name": "Full name", "phone": "Phone"}}"#,
//! ).unwrap();
//!
//! let mut record = Record::new();
//! let patch = FieldPatch::new().with("name", Some("Rohan Sharma"));
//! record.apply_patch(&schema, &patch);
//!
//! assert_eq!(record.get("name"), Some("Rohan Sharma"));
//! assert_eq!(missing_fields(&record, &schema), vec!["phone".to_string()]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod completeness;
pub mod record;
pub mod schema;
pub mod submission;
pub mod traits;
pub mod turn;

// Re-exports for convenience
pub use completeness::{is_complete, missing_fields};
pub use record::{FieldPatch, MergeReport, Record, RecordSnapshot};
pub use schema::{FieldSchema, FieldSpec, Requirement, SchemaError};
pub use submission::{SubmissionId, SubmissionReceipt};
pub use turn::{Role, Turn, TurnLog};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as seconds since the Unix epoch.
///
/// Clock skew before the epoch collapses to zero rather than failing.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
