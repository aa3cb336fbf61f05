//! Saathi Extractor
//!
//! Turns one user message into the assistant's reply plus candidate field
//! values, using an LLM.
//!
//! # Architecture
//!
//! ```text
//! message + record + history → PromptBuilder → LLM → raw reply
//! raw reply → parse_reply → FieldPatch → Record::apply_patch
//! ```
//!
//! The model is asked to answer in two parts separated by a `---JSON---`
//! line: text for the user, then a JSON object with a value (or null) for
//! each field. [`parse_reply`] tolerates the usual deviations: a markdown
//! fence around the JSON, groups nested under `required_fields` and
//! `optional_fields`, and numbers or booleans in place of strings.
//!
//! # Example Usage
//!
//! ```no_run
//! use saathi_domain::{FieldSchema, Record, TurnLog};
//! use saathi_extractor::{merge, ExtractionRequest, Extractor, ExtractorConfig};
//! use saathi_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = FieldSchema::fir_default()?;
//! let mut record = Record::new();
//! let log = TurnLog::new();
//!
//! let extractor = Extractor::new(MockProvider::default(), ExtractorConfig::default());
//! let reply = extractor
//!     .extract(ExtractionRequest {
//!         schema: &schema,
//!         record: &record,
//!         history: log.turns(),
//!         message: "My phone was stolen at the bus stop",
//!     })
//!     .await?;
//!
//! let outcome = merge(&reply, &schema, &mut record);
//! println!("{}", outcome.display_text);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod merge;
mod parser;
mod prompt;
mod types;

#[cfg(test)]
mod tests;

pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use merge::merge;
pub use parser::{parse_reply, JSON_MARKER};
pub use prompt::PromptBuilder;
pub use types::{ExtractionRequest, MergeOutcome, ModelReply, PayloadDiagnostic};
