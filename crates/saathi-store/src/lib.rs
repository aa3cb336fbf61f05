//! Saathi Storage Layer
//!
//! Implements the `RecordSink` trait on SQLite. Each finalized record becomes
//! one row of the `submissions` table, keyed by a time-ordered UUID.
//!
//! # Examples
//!
//! ```no_run
//! use saathi_store::SqliteSink;
//!
//! let sink = SqliteSink::new("saathi.db").unwrap();
//! for submission in sink.list_submissions(10).unwrap() {
//!     println!("{} from session {}", submission.submission_id, submission.session_id);
//! }
//! ```

#![warn(missing_docs)]

use rusqlite::{params, Connection, OptionalExtension};
use saathi_domain::traits::RecordSink;
use saathi_domain::{unix_timestamp, Record, SubmissionId, SubmissionReceipt};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// A stored submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredSubmission {
    /// Id assigned at submission
    pub submission_id: SubmissionId,
    /// Session the record was collected in
    pub session_id: String,
    /// Unix timestamp (seconds)
    pub submitted_at: u64,
    /// The finalized record
    pub record: Record,
}

impl StoredSubmission {
    /// Receipt that was handed out for this submission
    pub fn receipt(&self) -> SubmissionReceipt {
        SubmissionReceipt {
            submission_id: self.submission_id,
            session_id: self.session_id.clone(),
            submitted_at: self.submitted_at,
        }
    }
}

/// SQLite-backed record sink
///
/// SQLite connections are not shareable across threads; wrap the sink in a
/// mutex to use it from several tasks.
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Open (or create) the database at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let sink = Self { conn };
        sink.initialize_schema()?;
        Ok(sink)
    }

    /// In-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    /// Store a record and return its receipt
    pub fn insert(&self, session_id: &str, record: &Record) -> Result<SubmissionReceipt, StoreError> {
        let receipt = SubmissionReceipt {
            submission_id: SubmissionId::new(),
            session_id: session_id.to_string(),
            submitted_at: unix_timestamp(),
        };
        let record_json = serde_json::to_string(record)?;

        self.conn.execute(
            "INSERT INTO submissions (id, session_id, submitted_at, record_json)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                receipt.submission_id.to_string(),
                receipt.session_id,
                receipt.submitted_at as i64,
                record_json
            ],
        )?;

        info!(
            "Stored submission {} for session {}",
            receipt.submission_id, session_id
        );
        Ok(receipt)
    }

    /// Look up one submission
    pub fn get_submission(&self, id: &SubmissionId) -> Result<Option<StoredSubmission>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, session_id, submitted_at, record_json FROM submissions WHERE id = ?1",
                params![id.to_string()],
                Self::read_row,
            )
            .optional()?;

        row.map(Self::decode).transpose()
    }

    /// Most recent submissions first, at most `limit`
    pub fn list_submissions(&self, limit: usize) -> Result<Vec<StoredSubmission>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, submitted_at, record_json FROM submissions
             ORDER BY submitted_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], Self::read_row)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Listed {} submissions", rows.len());
        rows.into_iter().map(Self::decode).collect()
    }

    /// Number of stored submissions
    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM submissions", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
        Ok(RawRow {
            id: row.get(0)?,
            session_id: row.get(1)?,
            submitted_at: row.get(2)?,
            record_json: row.get(3)?,
        })
    }

    fn decode(raw: RawRow) -> Result<StoredSubmission, StoreError> {
        let submission_id = SubmissionId::parse(&raw.id).map_err(StoreError::InvalidData)?;
        let record: Record = serde_json::from_str(&raw.record_json)?;
        Ok(StoredSubmission {
            submission_id,
            session_id: raw.session_id,
            submitted_at: raw.submitted_at.max(0) as u64,
            record,
        })
    }
}

struct RawRow {
    id: String,
    session_id: String,
    submitted_at: i64,
    record_json: String,
}

impl RecordSink for SqliteSink {
    type Error = StoreError;

    fn submit_record(
        &mut self,
        session_id: &str,
        record: &Record,
    ) -> Result<SubmissionReceipt, Self::Error> {
        self.insert(session_id, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saathi_domain::{FieldPatch, FieldSchema};

    fn sample_record() -> Record {
        let schema = FieldSchema::from_json(
            r#"{"required_fields": {"complainant_name": "Name", "incident_date": "Date"}}"#,
        )
        .unwrap();
        let mut record = Record::new();
        record.apply_patch(
            &schema,
            &FieldPatch::new()
                .with("complainant_name", Some("Asha"))
                .with("incident_date", Some("2024-03-12")),
        );
        record
    }

    #[test]
    fn test_submit_and_get() {
        let mut sink = SqliteSink::in_memory().unwrap();
        let record = sample_record();

        let receipt = sink.submit_record("session-1", &record).unwrap();
        let stored = sink.get_submission(&receipt.submission_id).unwrap().unwrap();

        assert_eq!(stored.session_id, "session-1");
        assert_eq!(stored.record, record);
        assert_eq!(stored.receipt(), receipt);
    }

    #[test]
    fn test_get_unknown_submission() {
        let sink = SqliteSink::in_memory().unwrap();
        assert!(sink.get_submission(&SubmissionId::new()).unwrap().is_none());
    }

    #[test]
    fn test_same_session_can_submit_twice() {
        let mut sink = SqliteSink::in_memory().unwrap();
        let record = sample_record();

        let first = sink.submit_record("s", &record).unwrap();
        let second = sink.submit_record("s", &record).unwrap();

        assert_ne!(first.submission_id, second.submission_id);
        assert_eq!(sink.count().unwrap(), 2);
    }

    #[test]
    fn test_list_respects_limit() {
        let mut sink = SqliteSink::in_memory().unwrap();
        let record = sample_record();
        for i in 0..5 {
            sink.submit_record(&format!("s{}", i), &record).unwrap();
        }

        assert_eq!(sink.list_submissions(3).unwrap().len(), 3);
        assert_eq!(sink.list_submissions(10).unwrap().len(), 5);
    }

    #[test]
    fn test_corrupt_row_is_reported() {
        let sink = SqliteSink::in_memory().unwrap();
        sink.conn
            .execute(
                "INSERT INTO submissions VALUES ('not-a-uuid', 's', 0, '{}')",
                [],
            )
            .unwrap();

        assert!(matches!(
            sink.list_submissions(10),
            Err(StoreError::InvalidData(_))
        ));
    }
}
