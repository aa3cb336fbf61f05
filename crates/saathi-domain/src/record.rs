//! The slot-filled record and its merge rule
//!
//! A [`Record`] only changes through [`Record::apply_patch`] (or an explicit
//! [`Record::clear`]). The merge rule is monotonic: a field holding a value is
//! only ever replaced by another non-empty value, never erased by a null,
//! blank or `"null"` candidate.

use crate::schema::FieldSchema;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Candidate field values extracted from one model reply
///
/// Entries keep their insertion order; setting a name twice keeps the last
/// value in the position of the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPatch {
    entries: Vec<(String, Option<String>)>,
}

impl FieldPatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FieldPatch::set`]
    pub fn with(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.set(name, value.map(str::to_string));
        self
    }

    /// Set the candidate for `name`, replacing an earlier candidate
    pub fn set(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Candidate for `name`; `Some(None)` means "present but null"
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_deref())
    }

    /// Iterate over `(name, candidate)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_deref()))
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the patch carries no candidates
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What a merge changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Fields whose value changed, in patch order
    pub updated: Vec<String>,
    /// Keys outside the schema's field set, dropped
    pub ignored: Vec<String>,
}

impl MergeReport {
    /// Whether the merge changed the record
    pub fn changed(&self) -> bool {
        !self.updated.is_empty()
    }
}

/// Known field values for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, String>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `name`, if known
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Whether `name` holds a non-empty value
    pub fn is_filled(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.trim().is_empty())
    }

    /// Iterate over known `(name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of known fields
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no field is known yet
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge candidate values into the record
    ///
    /// For each candidate whose key belongs to `schema`: a non-null value that
    /// is non-empty after trimming and not the literal `"null"` replaces the
    /// stored value (stored trimmed). Anything else leaves the field as it was.
    /// Keys outside the schema are ignored and reported.
    ///
    /// Re-applying the same patch is a no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// use saathi_domain::{FieldPatch, FieldSchema, Record};
    ///
    /// let schema = FieldSchema::from_json(
    ///     r#"{"required_fields": {"district": "d"}, "optional_fields": {"policeStation": "p"}}"#,
    /// ).unwrap();
    /// let mut record = Record::new();
    /// record.apply_patch(&schema, &FieldPatch::new().with("district", Some("Gurugram")));
    ///
    /// let patch = FieldPatch::new()
    ///     .with("district", None)
    ///     .with("policeStation", Some("Cyber City"));
    /// let report = record.apply_patch(&schema, &patch);
    ///
    /// assert_eq!(record.get("district"), Some("Gurugram"));
    /// assert_eq!(record.get("policeStation"), Some("Cyber City"));
    /// assert_eq!(report.updated, vec!["policeStation".to_string()]);
    /// ```
    pub fn apply_patch(&mut self, schema: &FieldSchema, patch: &FieldPatch) -> MergeReport {
        let mut report = MergeReport::default();

        for (name, candidate) in patch.iter() {
            if !schema.contains(name) {
                report.ignored.push(name.to_string());
                continue;
            }

            let Some(value) = usable_value(candidate) else {
                continue;
            };

            if self.get(name) != Some(value) {
                self.values.insert(name.to_string(), value.to_string());
                report.updated.push(name.to_string());
            }
        }

        report
    }

    /// Forget every value (explicit reset only)
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Every schema field in declaration order, `None` where unknown
    pub fn snapshot(&self, schema: &FieldSchema) -> RecordSnapshot {
        RecordSnapshot(
            schema
                .fields()
                .iter()
                .map(|f| (f.name.clone(), self.get(&f.name).map(str::to_string)))
                .collect(),
        )
    }
}

/// Trimmed candidate value, or `None` when it must not overwrite anything
fn usable_value(candidate: Option<&str>) -> Option<&str> {
    let value = candidate?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(value)
    }
}

/// Owned, schema-ordered view of a record
///
/// Serializes as a JSON object listing every schema field, with `null` for
/// unknown values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSnapshot(Vec<(String, Option<String>)>);

impl RecordSnapshot {
    /// Value of `name` in the snapshot
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Iterate over `(name, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_deref()))
    }

    /// Number of known values
    pub fn filled(&self) -> usize {
        self.0.iter().filter(|(_, v)| v.is_some()).count()
    }
}

impl Serialize for RecordSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FieldSchema {
        FieldSchema::from_json(
            r#"{
                "required_fields": {
                    "complainant_name": "Name",
                    "incident_date": "Date",
                    "district": "District"
                },
                "optional_fields": {"policeStation": "Police station"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_merge_into_empty_record() {
        let mut record = Record::new();
        let patch = FieldPatch::new()
            .with("complainant_name", Some("Rohan Sharma"))
            .with("incident_date", None);

        let report = record.apply_patch(&schema(), &patch);

        assert_eq!(record.get("complainant_name"), Some("Rohan Sharma"));
        assert_eq!(record.get("incident_date"), None);
        assert_eq!(report.updated, vec!["complainant_name".to_string()]);
    }

    #[test]
    fn test_null_does_not_erase_known_value() {
        let schema = schema();
        let mut record = Record::new();
        record.apply_patch(&schema, &FieldPatch::new().with("district", Some("Gurugram")));

        let patch = FieldPatch::new()
            .with("district", None)
            .with("policeStation", Some("Cyber City"));
        record.apply_patch(&schema, &patch);

        assert_eq!(record.get("district"), Some("Gurugram"));
        assert_eq!(record.get("policeStation"), Some("Cyber City"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_blank_and_literal_null_are_ignored() {
        let schema = schema();
        let mut record = Record::new();
        record.apply_patch(&schema, &FieldPatch::new().with("district", Some("Gurugram")));

        for candidate in ["", "   ", "null", "NULL", " Null "] {
            let report =
                record.apply_patch(&schema, &FieldPatch::new().with("district", Some(candidate)));
            assert!(!report.changed(), "candidate {:?} changed the record", candidate);
            assert_eq!(record.get("district"), Some("Gurugram"));
        }
    }

    #[test]
    fn test_non_empty_value_replaces_previous() {
        let schema = schema();
        let mut record = Record::new();
        record.apply_patch(&schema, &FieldPatch::new().with("district", Some("Gurugram")));
        record.apply_patch(&schema, &FieldPatch::new().with("district", Some("  Faridabad ")));
        assert_eq!(record.get("district"), Some("Faridabad"));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut record = Record::new();
        let patch = FieldPatch::new()
            .with("favourite_colour", Some("blue"))
            .with("district", Some("Gurugram"));

        let report = record.apply_patch(&schema(), &patch);

        assert_eq!(record.get("favourite_colour"), None);
        assert_eq!(report.ignored, vec!["favourite_colour".to_string()]);
        assert_eq!(report.updated, vec!["district".to_string()]);
    }

    #[test]
    fn test_reapplying_patch_is_noop() {
        let schema = schema();
        let mut record = Record::new();
        let patch = FieldPatch::new()
            .with("complainant_name", Some("Rohan Sharma"))
            .with("district", Some("Gurugram"));

        record.apply_patch(&schema, &patch);
        let once = record.clone();
        let report = record.apply_patch(&schema, &patch);

        assert_eq!(record, once);
        assert!(!report.changed());
    }

    #[test]
    fn test_patch_set_replaces_in_place() {
        let mut patch = FieldPatch::new().with("a", Some("1")).with("b", Some("2"));
        patch.set("a", None);
        let entries: Vec<_> = patch.iter().collect();
        assert_eq!(entries, vec![("a", None), ("b", Some("2"))]);
        assert_eq!(patch.get("a"), Some(None));
        assert_eq!(patch.get("c"), None);
    }

    #[test]
    fn test_snapshot_lists_every_field_in_order() {
        let schema = schema();
        let mut record = Record::new();
        record.apply_patch(&schema, &FieldPatch::new().with("district", Some("Gurugram")));

        let snapshot = record.snapshot(&schema);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(
            json,
            r#"{"complainant_name":null,"incident_date":null,"district":"Gurugram","policeStation":null}"#
        );
        assert_eq!(snapshot.filled(), 1);
    }

    #[test]
    fn test_clear() {
        let schema = schema();
        let mut record = Record::new();
        record.apply_patch(&schema, &FieldPatch::new().with("district", Some("Gurugram")));
        record.clear();
        assert!(record.is_empty());
    }

    #[test]
    fn test_record_serde_roundtrip() {
        let schema = schema();
        let mut record = Record::new();
        record.apply_patch(&schema, &FieldPatch::new().with("district", Some("Gurugram")));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"district":"Gurugram"}"#);
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
