//! Record readiness and guarded submission

use crate::GatekeeperError;
use saathi_domain::traits::RecordSink;
use saathi_domain::{missing_fields, FieldSchema, Record, SubmissionReceipt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Whether a record can be submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    /// Every required field is filled
    Ready,

    /// At least one required field is missing
    Incomplete,
}

/// Result of evaluating a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    /// Ready or incomplete
    pub status: ValidationStatus,

    /// Missing required fields in schema order (empty when ready)
    pub missing: Vec<String>,
}

impl Readiness {
    /// Whether the record can be submitted
    pub fn is_ready(&self) -> bool {
        self.status == ValidationStatus::Ready
    }
}

/// The Gatekeeper guards submission of records
#[derive(Debug, Clone)]
pub struct Gatekeeper {
    schema: Arc<FieldSchema>,
}

impl Gatekeeper {
    /// Create a Gatekeeper for `schema`
    pub fn new(schema: Arc<FieldSchema>) -> Self {
        Self { schema }
    }

    /// Schema the gatekeeper checks against
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Check which required fields are still missing
    pub fn evaluate(&self, record: &Record) -> Readiness {
        let missing = missing_fields(record, &self.schema);
        let status = if missing.is_empty() {
            ValidationStatus::Ready
        } else {
            ValidationStatus::Incomplete
        };
        Readiness { status, missing }
    }

    /// Hand a complete record to `sink`
    ///
    /// The sink is only called when every required field is filled. Sink
    /// errors are surfaced with their message unchanged.
    pub fn submit<S: RecordSink>(
        &self,
        session_id: &str,
        record: &Record,
        sink: &mut S,
    ) -> Result<SubmissionReceipt, GatekeeperError> {
        let readiness = self.evaluate(record);
        if !readiness.is_ready() {
            info!(
                "Submission for session {} rejected, {} required fields missing",
                session_id,
                readiness.missing.len()
            );
            return Err(GatekeeperError::Incomplete {
                missing: readiness.missing,
            });
        }

        match sink.submit_record(session_id, record) {
            Ok(receipt) => {
                info!(
                    "Session {} submitted as {}",
                    session_id, receipt.submission_id
                );
                Ok(receipt)
            }
            Err(e) => {
                warn!("Sink rejected record for session {}: {}", session_id, e);
                Err(GatekeeperError::Persistence(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saathi_domain::{unix_timestamp, FieldPatch, SubmissionId};

    #[derive(Default)]
    struct RecordingSink {
        submitted: Vec<(String, Record)>,
        fail_with: Option<String>,
    }

    impl RecordSink for RecordingSink {
        type Error = String;

        fn submit_record(
            &mut self,
            session_id: &str,
            record: &Record,
        ) -> Result<SubmissionReceipt, Self::Error> {
            if let Some(message) = &self.fail_with {
                return Err(message.clone());
            }
            self.submitted.push((session_id.to_string(), record.clone()));
            Ok(SubmissionReceipt {
                submission_id: SubmissionId::new(),
                session_id: session_id.to_string(),
                submitted_at: unix_timestamp(),
            })
        }
    }

    fn gatekeeper() -> Gatekeeper {
        let schema = FieldSchema::from_json(
            r#"{"required_fields": {"name": "Name", "phone": "Phone"}, "optional_fields": {"email": "Email"}}"#,
        )
        .unwrap();
        Gatekeeper::new(Arc::new(schema))
    }

    fn complete_record(gatekeeper: &Gatekeeper) -> Record {
        let mut record = Record::new();
        record.apply_patch(
            gatekeeper.schema(),
            &FieldPatch::new().with("name", Some("A")).with("phone", Some("98")),
        );
        record
    }

    #[test]
    fn test_evaluate_incomplete() {
        let gatekeeper = gatekeeper();
        let mut record = Record::new();
        record.apply_patch(gatekeeper.schema(), &FieldPatch::new().with("name", Some("A")));

        let readiness = gatekeeper.evaluate(&record);
        assert_eq!(readiness.status, ValidationStatus::Incomplete);
        assert_eq!(readiness.missing, vec!["phone".to_string()]);
    }

    #[test]
    fn test_evaluate_ready_ignores_optional() {
        let gatekeeper = gatekeeper();
        let readiness = gatekeeper.evaluate(&complete_record(&gatekeeper));
        assert!(readiness.is_ready());
        assert!(readiness.missing.is_empty());
    }

    #[test]
    fn test_submit_incomplete_does_not_call_sink() {
        let gatekeeper = gatekeeper();
        let mut sink = RecordingSink::default();

        let result = gatekeeper.submit("s1", &Record::new(), &mut sink);
        assert_eq!(
            result,
            Err(GatekeeperError::Incomplete {
                missing: vec!["name".to_string(), "phone".to_string()]
            })
        );
        assert!(sink.submitted.is_empty());
    }

    #[test]
    fn test_submit_complete_record() {
        let gatekeeper = gatekeeper();
        let record = complete_record(&gatekeeper);
        let mut sink = RecordingSink::default();

        let receipt = gatekeeper.submit("s1", &record, &mut sink).unwrap();
        assert_eq!(receipt.session_id, "s1");
        assert_eq!(sink.submitted, vec![("s1".to_string(), record)]);
    }

    #[test]
    fn test_sink_error_is_surfaced_verbatim() {
        let gatekeeper = gatekeeper();
        let record = complete_record(&gatekeeper);
        let mut sink = RecordingSink {
            fail_with: Some("disk full".to_string()),
            ..Default::default()
        };

        let result = gatekeeper.submit("s1", &record, &mut sink);
        assert_eq!(result, Err(GatekeeperError::Persistence("disk full".to_string())));
    }

    #[test]
    fn test_incomplete_error_message() {
        let err = GatekeeperError::Incomplete {
            missing: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "Record is incomplete, missing: a, b");
    }
}
