//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Intake operation failed
    #[error(transparent)]
    Intake(#[from] saathi_intake::IntakeError),

    /// Submission store error
    #[error("Store error: {0}")]
    Store(#[from] saathi_store::StoreError),

    /// Schema could not be loaded
    #[error("Schema error: {0}")]
    Schema(#[from] saathi_domain::SchemaError),

    /// Model backend could not be built
    #[error("LLM error: {0}")]
    Llm(#[from] saathi_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Lookup found nothing
    #[error("Not found: {0}")]
    NotFound(String),
}
