//! Apply an interpreted reply to a record

use crate::parser::parse_reply;
use crate::types::MergeOutcome;
use saathi_domain::{FieldSchema, MergeReport, Record};
use tracing::debug;

/// Interpret `raw_reply` and merge its candidates into `record`
///
/// The record is left untouched when the reply has no usable JSON part; the
/// reason is returned in [`MergeOutcome::diagnostic`].
///
/// # Examples
///
/// ```
/// use saathi_domain::{FieldSchema, Record};
/// use saathi_extractor::merge;
///
/// let schema = FieldSchema::from_json(r#"{"required_fields": {"district": "d"}}"#).unwrap();
/// let mut record = Record::new();
///
/// let outcome = merge("Noted.\n---JSON---\n{\"district\": \"Gurugram\"}", &schema, &mut record);
/// assert_eq!(outcome.display_text, "Noted.");
/// assert_eq!(record.get("district"), Some("Gurugram"));
/// ```
pub fn merge(raw_reply: &str, schema: &FieldSchema, record: &mut Record) -> MergeOutcome {
    let reply = parse_reply(raw_reply);

    let report = match &reply.patch {
        Some(patch) => record.apply_patch(schema, patch),
        None => MergeReport::default(),
    };

    if !report.ignored.is_empty() {
        debug!("Dropped keys outside the schema: {:?}", report.ignored);
    }
    if report.changed() {
        debug!("Updated fields: {:?}", report.updated);
    }

    MergeOutcome {
        display_text: reply.conversational_text,
        report,
        diagnostic: reply.diagnostic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PayloadDiagnostic;
    use saathi_domain::FieldPatch;

    fn schema() -> FieldSchema {
        FieldSchema::from_json(
            r#"{
                "required_fields": {"complainant_name": "Name", "district": "District"},
                "optional_fields": {"policeStation": "Police station"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_merge_keeps_existing_values() {
        let schema = schema();
        let mut record = Record::new();
        record.apply_patch(&schema, &FieldPatch::new().with("district", Some("Gurugram")));

        let outcome = merge(
            "ok\n---JSON---\n{\"district\": null, \"policeStation\": \"Cyber City\"}",
            &schema,
            &mut record,
        );

        assert_eq!(record.get("district"), Some("Gurugram"));
        assert_eq!(record.get("policeStation"), Some("Cyber City"));
        assert_eq!(outcome.report.updated, vec!["policeStation".to_string()]);
    }

    #[test]
    fn test_merge_ignores_blank_and_null_literal() {
        let schema = schema();
        let mut record = Record::new();
        record.apply_patch(&schema, &FieldPatch::new().with("complainant_name", Some("Asha")));

        merge(
            "ok ---JSON--- {\"complainant_name\": \"   \", \"district\": \"NULL\"}",
            &schema,
            &mut record,
        );

        assert_eq!(record.get("complainant_name"), Some("Asha"));
        assert_eq!(record.get("district"), None);
    }

    #[test]
    fn test_merge_reports_unknown_keys() {
        let schema = schema();
        let mut record = Record::new();
        let outcome = merge("ok ---JSON--- {\"favourite_colour\": \"blue\"}", &schema, &mut record);

        assert!(record.is_empty());
        assert_eq!(outcome.report.ignored, vec!["favourite_colour".to_string()]);
    }

    #[test]
    fn test_merge_unusable_reply_leaves_record() {
        let schema = schema();
        let mut record = Record::new();
        record.apply_patch(&schema, &FieldPatch::new().with("district", Some("Pune")));
        let before = record.clone();

        let outcome = merge("Sorry?\n---JSON---\n{not valid}", &schema, &mut record);
        assert_eq!(record, before);
        assert_eq!(outcome.display_text, "Sorry?");
        assert!(matches!(outcome.diagnostic, Some(PayloadDiagnostic::MalformedJson(_))));

        let outcome = merge("Just text", &schema, &mut record);
        assert_eq!(record, before);
        assert_eq!(outcome.display_text, "Just text");
        assert_eq!(outcome.diagnostic, Some(PayloadDiagnostic::MissingMarker));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let schema = schema();
        let mut record = Record::new();
        let reply = "ok ---JSON--- {\"complainant_name\": \" Asha \", \"district\": \"Pune\"}";

        let first = merge(reply, &schema, &mut record);
        let after_first = record.clone();
        let second = merge(reply, &schema, &mut record);

        assert_eq!(first.report.updated.len(), 2);
        assert!(second.report.updated.is_empty());
        assert_eq!(record, after_first);
        assert_eq!(record.get("complainant_name"), Some("Asha"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{Map, Value};

    const REQUIRED: [&str; 3] = ["complainant_name", "incident_date", "incident_location"];
    const OPTIONAL: [&str; 2] = ["district", "police_station"];

    fn schema() -> FieldSchema {
        FieldSchema::from_json(
            r#"{"required_fields": {"complainant_name": "n", "incident_date": "d", "incident_location": "l"},
                "optional_fields": {"district": "x", "police_station": "p"}}"#,
        )
        .unwrap()
    }

    fn value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            Just(Value::String("null".to_string())),
            Just(Value::String("  ".to_string())),
            "[a-zA-Z ]{1,10}".prop_map(Value::String),
            (0u32..10_000).prop_map(Value::from),
        ]
    }

    fn group(keys: &'static [&'static str]) -> impl Strategy<Value = Map<String, Value>> {
        prop::collection::vec((0..keys.len(), value()), 0..4).prop_map(move |entries| {
            entries
                .into_iter()
                .map(|(idx, v)| (keys[idx].to_string(), v))
                .collect()
        })
    }

    fn seeded_record(schema: &FieldSchema, seed: &Map<String, Value>) -> Record {
        let mut record = Record::new();
        let reply = format!("seed\n---JSON---\n{}", Value::Object(seed.clone()));
        merge(&reply, schema, &mut record);
        record
    }

    proptest! {
        /// Property: {"required_fields": C, "optional_fields": D} merges like C ∪ D
        #[test]
        fn test_nested_and_flat_replies_merge_identically(
            seed in group(&OPTIONAL),
            required in group(&REQUIRED),
            optional in group(&OPTIONAL),
        ) {
            let schema = schema();

            let mut nested = Map::new();
            nested.insert("required_fields".to_string(), Value::Object(required.clone()));
            nested.insert("optional_fields".to_string(), Value::Object(optional.clone()));
            let mut flat = required;
            flat.extend(optional);

            let mut from_nested = seeded_record(&schema, &seed);
            let mut from_flat = from_nested.clone();
            let a = merge(&format!("ok\n---JSON---\n{}", Value::Object(nested)), &schema, &mut from_nested);
            let b = merge(&format!("ok\n---JSON---\n{}", Value::Object(flat)), &schema, &mut from_flat);

            prop_assert_eq!(from_nested, from_flat);
            let (mut updated_a, mut updated_b) = (a.report.updated, b.report.updated);
            updated_a.sort();
            updated_b.sort();
            prop_assert_eq!(updated_a, updated_b);
            prop_assert_eq!(a.diagnostic, b.diagnostic);
        }

        /// Property: a fenced JSON segment parses exactly like the bare one
        #[test]
        fn test_fenced_segment_parses_like_bare_segment(
            payload in group(&REQUIRED),
            tag in prop_oneof![Just(""), Just("json"), Just("JSON")],
        ) {
            let body = Value::Object(payload).to_string();
            let bare = parse_reply(&format!("Go on.\n---JSON---\n{}", body));
            let fenced = parse_reply(&format!("Go on.\n---JSON---\n```{}\n{}\n```", tag, body));

            prop_assert_eq!(fenced, bare);
        }
    }
}
