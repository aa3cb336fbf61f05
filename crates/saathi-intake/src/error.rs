//! Error types for intake operations

use saathi_extractor::ExtractorError;
use saathi_gatekeeper::GatekeeperError;
use thiserror::Error;

/// Errors returned by [`crate::Intake`]
///
/// None of these end the session; the conversation continues from the last
/// merged state.
#[derive(Error, Debug)]
pub enum IntakeError {
    /// The model call failed, timed out or returned nothing
    #[error("Extraction failed: {0}")]
    Extraction(ExtractorError),

    /// Finalize was attempted with required fields missing
    #[error("Record is incomplete, missing: {}", .missing.join(", "))]
    Incomplete {
        /// Missing required fields in schema order
        missing: Vec<String>,
    },

    /// The record sink failed; the record is retained
    #[error("{0}")]
    Persistence(String),

    /// The caller sent something unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Extraction settings are out of range
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// No live session has this id
    #[error("Unknown session: {0}")]
    UnknownSession(String),
}

impl From<ExtractorError> for IntakeError {
    fn from(err: ExtractorError) -> Self {
        match err {
            ExtractorError::EmptyMessage | ExtractorError::MessageTooLong(..) => {
                IntakeError::InvalidInput(err.to_string())
            }
            other => IntakeError::Extraction(other),
        }
    }
}

impl From<GatekeeperError> for IntakeError {
    fn from(err: GatekeeperError) -> Self {
        match err {
            GatekeeperError::Incomplete { missing } => IntakeError::Incomplete { missing },
            GatekeeperError::Persistence(msg) => IntakeError::Persistence(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_not_extraction_failures() {
        let err = IntakeError::from(ExtractorError::MessageTooLong(10, 5));
        assert!(matches!(err, IntakeError::InvalidInput(_)));

        let err = IntakeError::from(ExtractorError::Timeout(60));
        assert!(matches!(err, IntakeError::Extraction(ExtractorError::Timeout(60))));
    }

    #[test]
    fn test_gatekeeper_errors_map_through() {
        let err = IntakeError::from(GatekeeperError::Persistence("disk full".into()));
        assert_eq!(err.to_string(), "disk full");

        let err = IntakeError::from(GatekeeperError::Incomplete {
            missing: vec!["phone".into()],
        });
        assert!(matches!(err, IntakeError::Incomplete { missing } if missing == ["phone"]));
    }
}
