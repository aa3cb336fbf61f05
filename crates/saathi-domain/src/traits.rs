//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the intake logic and
//! infrastructure. Implementations live in other crates.

use crate::record::Record;
use crate::submission::SubmissionReceipt;
use async_trait::async_trait;

/// Trait for text-generation backends
///
/// Implemented by the infrastructure layer (saathi-llm)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Generate a completion for a single prompt
    async fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Model identifier, for logs
    fn model_name(&self) -> &str;
}

/// Trait for the collaborator that receives finalized records
///
/// Implemented by the infrastructure layer (saathi-store)
pub trait RecordSink {
    /// Error type for sink operations
    type Error: std::fmt::Display;

    /// Persist a complete record collected in `session_id`
    fn submit_record(
        &mut self,
        session_id: &str,
        record: &Record,
    ) -> Result<SubmissionReceipt, Self::Error>;
}
