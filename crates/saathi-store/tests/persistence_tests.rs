//! On-disk persistence tests for SqliteSink

use saathi_domain::traits::RecordSink;
use saathi_domain::{FieldPatch, FieldSchema, Record};
use saathi_store::SqliteSink;
use tempfile::TempDir;

fn record(name: &str) -> Record {
    let schema = FieldSchema::fir_default().unwrap();
    let mut record = Record::new();
    record.apply_patch(&schema, &FieldPatch::new().with("complainant_name", Some(name)));
    record
}

#[test]
fn test_submissions_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("saathi.db");

    let receipt = {
        let mut sink = SqliteSink::new(&path).unwrap();
        sink.submit_record("session-a", &record("Asha")).unwrap()
    };

    let sink = SqliteSink::new(&path).unwrap();
    let stored = sink.get_submission(&receipt.submission_id).unwrap().unwrap();
    assert_eq!(stored.record.get("complainant_name"), Some("Asha"));
    assert_eq!(sink.count().unwrap(), 1);
}

#[test]
fn test_list_orders_by_submission_time() {
    let dir = TempDir::new().unwrap();
    let mut sink = SqliteSink::new(dir.path().join("saathi.db")).unwrap();

    let first = sink.submit_record("s1", &record("Asha")).unwrap();
    let second = sink.submit_record("s2", &record("Vikram")).unwrap();

    let listed = sink.list_submissions(10).unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[0].submitted_at >= listed[1].submitted_at);

    let ids: Vec<_> = listed.iter().map(|s| s.submission_id).collect();
    assert!(ids.contains(&first.submission_id));
    assert!(ids.contains(&second.submission_id));
}
