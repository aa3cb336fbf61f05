//! Identifiers and receipts for finalized records

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a submitted record, based on UUIDv7
///
/// UUIDv7 keeps submissions sortable by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(uuid::Uuid);

impl SubmissionId {
    /// Generate a new time-ordered id
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Parse an id from its hyphenated string form
    ///
    /// # Examples
    ///
    /// ```
    /// use saathi_domain::SubmissionId;
    ///
    /// let id = SubmissionId::new();
    /// let parsed = SubmissionId::parse(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid submission id: {}", e))
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Acknowledgement returned by a [`RecordSink`](crate::traits::RecordSink)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Id assigned to the stored record
    pub submission_id: SubmissionId,
    /// Session the record was collected in
    pub session_id: String,
    /// Unix timestamp (seconds) of the submission
    pub submitted_at: u64,
}
