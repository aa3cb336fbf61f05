//! Completeness check against the required field group

use crate::record::Record;
use crate::schema::FieldSchema;

/// Required fields that are absent or blank, in schema declaration order
///
/// The result is empty exactly when every required field holds a non-empty
/// trimmed value. This is the only gate for finalizing a record.
///
/// # Examples
///
/// ```
/// use saathi_domain::{FieldSchema, Record, missing_fields};
///
/// let schema = FieldSchema::from_json(
///     r#"{"required_fields": {"name": "Name", "phone": "Phone"}}"#,
/// ).unwrap();
///
/// assert_eq!(missing_fields(&Record::new(), &schema), vec!["name", "phone"]);
/// ```
pub fn missing_fields(record: &Record, schema: &FieldSchema) -> Vec<String> {
    schema
        .required()
        .filter(|field| !record.is_filled(&field.name))
        .map(|field| field.name.clone())
        .collect()
}

/// Whether every required field is filled
pub fn is_complete(record: &Record, schema: &FieldSchema) -> bool {
    schema.required().all(|field| record.is_filled(&field.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldPatch;

    fn schema() -> FieldSchema {
        FieldSchema::from_json(
            r#"{
                "required_fields": {"name": "Name", "phone": "Phone"},
                "optional_fields": {"email": "Email"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_blank_required_value_is_missing() {
        let schema = schema();
        let mut record = Record::new();
        let patch = FieldPatch::new().with("name", Some("A")).with("phone", Some(""));
        record.apply_patch(&schema, &patch);

        assert_eq!(missing_fields(&record, &schema), vec!["phone".to_string()]);
        assert!(!is_complete(&record, &schema));
    }

    #[test]
    fn test_complete_record() {
        let schema = schema();
        let mut record = Record::new();
        let patch = FieldPatch::new()
            .with("name", Some("A"))
            .with("phone", Some("98765 43210"));
        record.apply_patch(&schema, &patch);

        assert!(missing_fields(&record, &schema).is_empty());
        assert!(is_complete(&record, &schema));
    }

    #[test]
    fn test_optional_fields_never_missing() {
        let schema = schema();
        let mut record = Record::new();
        let patch = FieldPatch::new().with("name", Some("A")).with("phone", Some("1"));
        record.apply_patch(&schema, &patch);

        assert!(record.get("email").is_none());
        assert!(missing_fields(&record, &schema).is_empty());
    }

    #[test]
    fn test_order_follows_schema_declaration() {
        let schema = FieldSchema::from_json(
            r#"{"required_fields": {"z": "z", "a": "a", "m": "m"}}"#,
        )
        .unwrap();
        let mut record = Record::new();
        record.apply_patch(&schema, &FieldPatch::new().with("a", Some("x")));
        assert_eq!(missing_fields(&record, &schema), vec!["z", "m"]);
    }
}
