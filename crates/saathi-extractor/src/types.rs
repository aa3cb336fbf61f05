//! Types for extraction requests and interpreted replies

use saathi_domain::{FieldPatch, FieldSchema, MergeReport, Record, Turn};
use serde::{Serialize, Serializer};
use std::fmt;

/// Everything the model sees for one conversational turn
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    /// Field set being collected
    pub schema: &'a FieldSchema,

    /// Values known before this turn
    pub record: &'a Record,

    /// Earlier turns, oldest first; trimmed to the configured window
    pub history: &'a [Turn],

    /// The user's latest message
    pub message: &'a str,
}

/// Why the structured part of a reply could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadDiagnostic {
    /// The reply has no `---JSON---` marker
    MissingMarker,

    /// The text after the marker is not valid JSON
    MalformedJson(String),

    /// The JSON after the marker is not an object
    NotAnObject(&'static str),
}

impl PayloadDiagnostic {
    /// Stable identifier for logs and API payloads
    pub fn kind(&self) -> &'static str {
        match self {
            PayloadDiagnostic::MissingMarker => "missing_marker",
            PayloadDiagnostic::MalformedJson(_) => "malformed_json",
            PayloadDiagnostic::NotAnObject(_) => "not_an_object",
        }
    }
}

impl fmt::Display for PayloadDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadDiagnostic::MissingMarker => write!(f, "reply has no JSON segment"),
            PayloadDiagnostic::MalformedJson(err) => write!(f, "JSON segment is malformed: {}", err),
            PayloadDiagnostic::NotAnObject(found) => {
                write!(f, "JSON segment is {} instead of an object", found)
            }
        }
    }
}

impl Serialize for PayloadDiagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.kind())
    }
}

/// A model reply split into its two parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReply {
    /// Text to show the user
    pub conversational_text: String,

    /// Candidate values, absent when the JSON part was unusable
    pub patch: Option<FieldPatch>,

    /// Set when the JSON part was missing or unusable
    pub diagnostic: Option<PayloadDiagnostic>,
}

/// Result of interpreting a reply and merging it into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Text to show the user
    pub display_text: String,

    /// Fields changed and keys dropped
    pub report: MergeReport,

    /// Set when the record was left untouched because of the reply shape
    pub diagnostic: Option<PayloadDiagnostic>,
}
