//! Interpret a raw model reply
//!
//! A reply is conversational text, then the marker line, then a JSON object
//! of candidate field values. The JSON may be fenced in a markdown code block
//! and may be flat or nested under `required_fields` / `optional_fields`.
//! Nothing here fails: an unusable JSON part yields a diagnostic and no patch.

use crate::types::{ModelReply, PayloadDiagnostic};
use saathi_domain::FieldPatch;
use serde_json::{Map, Value};
use tracing::warn;

/// Line separating the conversational text from the JSON payload
pub const JSON_MARKER: &str = "---JSON---";

const REQUIRED_GROUP: &str = "required_fields";
const OPTIONAL_GROUP: &str = "optional_fields";

/// Split a raw reply into display text and candidate values
///
/// # Examples
///
/// ```
/// use saathi_extractor::parse_reply;
///
/// let reply = parse_reply("Thank you.\n---JSON---\n{\"district\": \"Gurugram\"}");
/// assert_eq!(reply.conversational_text, "Thank you.");
/// assert_eq!(reply.patch.unwrap().get("district"), Some(Some("Gurugram")));
/// ```
pub fn parse_reply(raw: &str) -> ModelReply {
    let Some((text, payload)) = raw.split_once(JSON_MARKER) else {
        warn!("Model reply has no {} marker, treating it as plain text", JSON_MARKER);
        return ModelReply {
            conversational_text: raw.trim().to_string(),
            patch: None,
            diagnostic: Some(PayloadDiagnostic::MissingMarker),
        };
    };

    let conversational_text = text.trim().to_string();
    match parse_payload(payload) {
        Ok(patch) => ModelReply {
            conversational_text,
            patch: Some(patch),
            diagnostic: None,
        },
        Err(diagnostic) => {
            warn!("Ignoring JSON segment of model reply: {}", diagnostic);
            ModelReply {
                conversational_text,
                patch: None,
                diagnostic: Some(diagnostic),
            }
        }
    }
}

fn parse_payload(payload: &str) -> Result<FieldPatch, PayloadDiagnostic> {
    let body = strip_code_fence(payload);

    // Only the first JSON value counts; models sometimes add a closing remark
    let mut values = serde_json::Deserializer::from_str(body).into_iter::<Value>();
    let value = match values.next() {
        Some(Ok(value)) => value,
        Some(Err(e)) => return Err(PayloadDiagnostic::MalformedJson(e.to_string())),
        None => return Err(PayloadDiagnostic::MalformedJson("segment is empty".to_string())),
    };

    match value {
        Value::Object(object) => Ok(flatten(object)),
        other => Err(PayloadDiagnostic::NotAnObject(json_type_name(&other))),
    }
}

/// Remove a surrounding markdown code fence, with or without a language tag
fn strip_code_fence(segment: &str) -> &str {
    let mut body = segment.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Flatten a reply object into one patch
///
/// Top-level scalar keys come first, then `required_fields` entries, then
/// `optional_fields` entries. A later null never displaces an earlier value.
fn flatten(object: Map<String, Value>) -> FieldPatch {
    let mut patch = FieldPatch::new();
    let mut groups: Vec<(String, Map<String, Value>)> = Vec::new();

    for (key, value) in object {
        let is_group = key == REQUIRED_GROUP || key == OPTIONAL_GROUP;
        match value {
            Value::Object(inner) if is_group => groups.push((key, inner)),
            value => offer(&mut patch, key, &value),
        }
    }

    groups.sort_by_key(|(key, _)| key != REQUIRED_GROUP);
    for (_, inner) in groups {
        for (key, value) in inner {
            offer(&mut patch, key, &value);
        }
    }

    patch
}

fn offer(patch: &mut FieldPatch, key: String, value: &Value) {
    let candidate = candidate_value(value);
    if candidate.is_none() && patch.get(&key).is_some() {
        return;
    }
    patch.set(key, candidate);
}

/// Scalars become text; null, arrays and objects carry no value
fn candidate_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_payload() {
        let reply = parse_reply(
            "Thanks, noted.\n---JSON---\n{\"complainant_name\": \"Rohan\", \"incident_date\": null}",
        );
        assert_eq!(reply.conversational_text, "Thanks, noted.");
        assert!(reply.diagnostic.is_none());

        let patch = reply.patch.unwrap();
        assert_eq!(patch.get("complainant_name"), Some(Some("Rohan")));
        assert_eq!(patch.get("incident_date"), Some(None));
    }

    #[test]
    fn test_parse_fenced_payload() {
        let raw = "Could you share the date?\n---JSON---\n```json\n{\"district\": \"Gurugram\"}\n```";
        let reply = parse_reply(raw);
        assert_eq!(reply.conversational_text, "Could you share the date?");
        assert_eq!(
            reply,
            parse_reply("Could you share the date?\n---JSON---\n{\"district\": \"Gurugram\"}")
        );
        assert_eq!(reply.patch.unwrap().get("district"), Some(Some("Gurugram")));
    }

    #[test]
    fn test_parse_fence_without_language_tag() {
        let reply = parse_reply("ok ---JSON--- ```{\"a\": \"b\"}```");
        assert_eq!(reply.patch.unwrap().get("a"), Some(Some("b")));
    }

    #[test]
    fn test_trailing_remark_after_object() {
        let reply = parse_reply("Hi\n---JSON---\n```JSON\n{\"a\": \"b\"}\n```\nLet me know!");
        assert!(reply.diagnostic.is_none());
        assert_eq!(reply.patch.unwrap().get("a"), Some(Some("b")));
    }

    #[test]
    fn test_nested_groups_are_flattened() {
        let raw = r#"Noted.
---JSON---
{
  "required_fields": {"complainant_name": "Asha", "incident_location": null},
  "optional_fields": {"district": "Pune"}
}"#;
        let patch = parse_reply(raw).patch.unwrap();
        assert_eq!(patch.get("complainant_name"), Some(Some("Asha")));
        assert_eq!(patch.get("incident_location"), Some(None));
        assert_eq!(patch.get("district"), Some(Some("Pune")));
        assert!(patch.get("required_fields").is_none());
    }

    #[test]
    fn test_optional_group_overrides_required_group() {
        let raw = r#"x ---JSON--- {
            "optional_fields": {"a": "from optional", "b": null},
            "required_fields": {"a": "from required", "b": "kept"}
        }"#;
        let patch = parse_reply(raw).patch.unwrap();
        assert_eq!(patch.get("a"), Some(Some("from optional")));
        assert_eq!(patch.get("b"), Some(Some("kept")));
    }

    #[test]
    fn test_scalars_are_stringified() {
        let patch = parse_reply(
            r#"x ---JSON--- {"age": 34, "injured": false, "items": ["a"], "meta": {"k": 1}}"#,
        )
        .patch
        .unwrap();
        assert_eq!(patch.get("age"), Some(Some("34")));
        assert_eq!(patch.get("injured"), Some(Some("false")));
        assert_eq!(patch.get("items"), Some(None));
        assert_eq!(patch.get("meta"), Some(None));
    }

    #[test]
    fn test_missing_marker() {
        let reply = parse_reply("  Please tell me more.  ");
        assert_eq!(reply.conversational_text, "Please tell me more.");
        assert!(reply.patch.is_none());
        assert_eq!(reply.diagnostic, Some(PayloadDiagnostic::MissingMarker));
    }

    #[test]
    fn test_malformed_json() {
        let reply = parse_reply("Sorry?\n---JSON---\n{not valid}");
        assert_eq!(reply.conversational_text, "Sorry?");
        assert!(reply.patch.is_none());
        assert!(matches!(reply.diagnostic, Some(PayloadDiagnostic::MalformedJson(_))));
    }

    #[test]
    fn test_empty_payload() {
        let reply = parse_reply("Hello\n---JSON---\n   ");
        assert!(matches!(reply.diagnostic, Some(PayloadDiagnostic::MalformedJson(_))));
    }

    #[test]
    fn test_payload_not_an_object() {
        let reply = parse_reply("Hello\n---JSON---\n[1, 2]");
        assert_eq!(reply.diagnostic, Some(PayloadDiagnostic::NotAnObject("an array")));
        assert_eq!(reply.diagnostic.unwrap().kind(), "not_an_object");
    }

    #[test]
    fn test_only_first_marker_splits() {
        let reply = parse_reply("a ---JSON--- {\"x\": \"---JSON---\"}");
        assert_eq!(reply.patch.unwrap().get("x"), Some(Some("---JSON---")));
    }
}
