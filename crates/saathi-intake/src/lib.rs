//! Saathi Intake
//!
//! Session-scoped conversation state and the operations a front end calls:
//! open a session, send a message, inject a document, look at the record,
//! finalize, reset and close.
//!
//! # Architecture
//!
//! ```text
//! message → SessionStore (per-session lock) → Extractor → merge → Gatekeeper → TurnOutcome
//! finalize → Gatekeeper::submit → RecordSink
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use saathi_domain::FieldSchema;
//! use saathi_extractor::ExtractorConfig;
//! use saathi_intake::Intake;
//! # use saathi_domain::{traits::RecordSink, Record, SubmissionReceipt};
//! # struct Discard;
//! # impl RecordSink for Discard {
//! #     type Error = String;
//! #     fn submit_record(&mut self, _: &str, _: &Record) -> Result<SubmissionReceipt, String> {
//! #         Err("discarded".into())
//! #     }
//! # }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Arc::new(FieldSchema::fir_default()?);
//! let llm = saathi_llm::MockProvider::default();
//! let intake = Intake::new(schema, llm, Discard, ExtractorConfig::default())?;
//!
//! let greeting = intake.open_session("user-1").await?;
//! println!("{}", greeting.message);
//!
//! let outcome = intake.submit_message("user-1", "Someone stole my bicycle").await?;
//! println!("{} (missing: {:?})", outcome.display_text, outcome.missing_fields);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod intake;
mod session;
mod types;

pub use error::IntakeError;
pub use intake::{Intake, COMPLETION_MESSAGE, DOCUMENT_ACKNOWLEDGEMENT, GREETING};
pub use session::{Session, SessionHandle, SessionStore};
pub use types::{DocumentReceipt, Greeting, SessionSnapshot, TurnOutcome};
