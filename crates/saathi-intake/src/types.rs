//! Results of intake operations

use saathi_domain::RecordSnapshot;
use saathi_extractor::PayloadDiagnostic;
use serde::Serialize;

/// Opening message of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Greeting {
    /// Session the greeting belongs to
    pub session_id: String,
    /// Text to show the user
    pub message: String,
}

/// What one user message produced
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// Assistant text to show the user
    pub display_text: String,
    /// Record after the merge, every schema field in order
    pub record: RecordSnapshot,
    /// Required fields still missing
    pub missing_fields: Vec<String>,
    /// Fields this turn changed
    pub updated_fields: Vec<String>,
    /// Reply keys outside the schema, dropped
    pub ignored_fields: Vec<String>,
    /// Whether every required field is now filled
    pub complete: bool,
    /// Why the record was not updated from this reply, if it was not
    pub diagnostic: Option<PayloadDiagnostic>,
}

/// Acknowledgement of an injected document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReceipt {
    /// Name the document was uploaded under
    pub filename: String,
    /// Characters of document text placed in the conversation
    pub characters: usize,
    /// Whether the text was cut to the configured limit
    pub truncated: bool,
    /// Assistant acknowledgement logged for the upload
    pub acknowledgement: String,
}

/// Point-in-time view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    /// Session id
    pub session_id: String,
    /// Every schema field in order, null where unknown
    pub record: RecordSnapshot,
    /// Required fields still missing
    pub missing_fields: Vec<String>,
    /// Number of logged turns
    pub turn_count: usize,
    /// Whether the record can be finalized
    pub complete: bool,
    /// Unix timestamp of the last activity
    pub last_active: u64,
}
