//! Field schema - the typed set of fields an intake session collects
//!
//! The persisted format is a JSON document with two top-level keys,
//! `required_fields` and `optional_fields`, each mapping a field name to a
//! descriptor. A descriptor is either a plain string or an object carrying a
//! `description` (or `label`) member.
//!
//! Declaration order is significant: the completeness check reports missing
//! fields in the order the schema lists them.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// The FIR template shipped with the assistant
pub const DEFAULT_FIR_TEMPLATE: &str = include_str!("fir_template.json");

/// Errors raised while loading a schema
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Failed to read the schema file
    #[error("Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    /// Schema document is not valid JSON or has the wrong shape
    #[error("Failed to parse schema: {0}")]
    Parse(#[from] serde_json::Error),

    /// The required group is empty
    #[error("Schema declares no required fields")]
    NoRequiredFields,

    /// A field name appears more than once
    #[error("Field declared more than once: {0}")]
    DuplicateField(String),

    /// A field name is blank
    #[error("Schema contains a blank field name")]
    BlankFieldName,
}

/// Whether a field must be filled before submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    /// Needed before the record can be finalized
    Required,
    /// Collected when offered, never blocks finalization
    Optional,
}

impl Requirement {
    /// Key of the group this requirement is persisted under
    pub fn group_key(&self) -> &'static str {
        match self {
            Requirement::Required => "required_fields",
            Requirement::Optional => "optional_fields",
        }
    }
}

/// A single field of the schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Field name as used in records and model replies
    pub name: String,
    /// Human-readable description shown to the model
    pub description: String,
    /// Required or optional
    pub requirement: Requirement,
}

/// Immutable, ordered set of known fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    fields: Vec<FieldSpec>,
}

impl FieldSchema {
    /// Parse a schema document
    ///
    /// # Examples
    ///
    /// ```
    /// use saathi_domain::FieldSchema;
    ///
    /// let schema = FieldSchema::from_json(r#"{
    ///     "required_fields": {"complainant_name": "Full name"},
    ///     "optional_fields": {"district": {"description": "District"}}
    /// }"#).unwrap();
    ///
    /// assert!(schema.contains("district"));
    /// assert_eq!(schema.required().count(), 1);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let raw: RawSchema = serde_json::from_str(json)?;
        Self::from_groups(raw.required_fields.0, raw.optional_fields.0)
    }

    /// Load a schema document from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// The embedded FIR template
    pub fn fir_default() -> Result<Self, SchemaError> {
        Self::from_json(DEFAULT_FIR_TEMPLATE)
    }

    fn from_groups(
        required: Vec<(String, Descriptor)>,
        optional: Vec<(String, Descriptor)>,
    ) -> Result<Self, SchemaError> {
        if required.is_empty() {
            return Err(SchemaError::NoRequiredFields);
        }

        let tagged = required
            .into_iter()
            .map(|entry| (entry, Requirement::Required))
            .chain(optional.into_iter().map(|entry| (entry, Requirement::Optional)));

        let mut fields: Vec<FieldSpec> = Vec::new();
        for ((name, descriptor), requirement) in tagged {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(SchemaError::BlankFieldName);
            }
            if fields.iter().any(|f| f.name == name) {
                return Err(SchemaError::DuplicateField(name));
            }
            let description = descriptor.into_description(&name);
            fields.push(FieldSpec {
                name,
                description,
                requirement,
            });
        }

        Ok(Self { fields })
    }

    /// All fields, required first, each group in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Required fields in declaration order
    pub fn required(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .filter(|f| f.requirement == Requirement::Required)
    }

    /// Optional fields in declaration order
    pub fn optional(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .filter(|f| f.requirement == Requirement::Optional)
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether `name` belongs to the typed field set
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of fields across both groups
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for a loaded schema (at least one required field)
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serialize back to the canonical nested document
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for FieldSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        for requirement in [Requirement::Required, Requirement::Optional] {
            map.serialize_entry(
                requirement.group_key(),
                &GroupView {
                    schema: self,
                    requirement,
                },
            )?;
        }
        map.end()
    }
}

/// Ordered `name -> description` view of one group
struct GroupView<'a> {
    schema: &'a FieldSchema,
    requirement: Requirement,
}

impl Serialize for GroupView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields: Vec<&FieldSpec> = self
            .schema
            .fields
            .iter()
            .filter(|f| f.requirement == self.requirement)
            .collect();
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for field in fields {
            map.serialize_entry(&field.name, &field.description)?;
        }
        map.end()
    }
}

#[derive(Deserialize)]
struct RawSchema {
    required_fields: FieldGroup,
    #[serde(default)]
    optional_fields: FieldGroup,
}

/// A JSON object read with its key order intact
#[derive(Default)]
struct FieldGroup(Vec<(String, Descriptor)>);

impl<'de> Deserialize<'de> for FieldGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GroupVisitor;

        impl<'de> Visitor<'de> for GroupVisitor {
            type Value = FieldGroup;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping from field name to descriptor")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FieldGroup, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, descriptor)) = access.next_entry::<String, Descriptor>()? {
                    entries.push((name, descriptor));
                }
                Ok(FieldGroup(entries))
            }
        }

        deserializer.deserialize_map(GroupVisitor)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Descriptor {
    Text(String),
    Detailed {
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        label: Option<String>,
    },
}

impl Descriptor {
    fn into_description(self, name: &str) -> String {
        let text = match self {
            Descriptor::Text(text) => Some(text),
            Descriptor::Detailed { description, label } => description.or(label),
        };
        match text {
            Some(text) if !text.trim().is_empty() => text.trim().to_string(),
            // Fall back to a readable form of the key
            _ => name.replace('_', " "),
        }
    }
}
