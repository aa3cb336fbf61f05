//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during an extraction call
///
/// Every variant is an extraction failure for the turn: the caller must not
/// merge anything and the record stays as it was.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// The model call did not finish in time
    #[error("Extraction timed out after {0} seconds")]
    Timeout(u64),

    /// The model answered with nothing usable
    #[error("Model returned an empty reply")]
    EmptyReply,

    /// The user message is blank
    #[error("Message is empty")]
    EmptyMessage,

    /// The user message exceeds the configured limit
    #[error("Message too long: {0} chars (max: {1})")]
    MessageTooLong(usize, usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
