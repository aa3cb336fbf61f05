//! Prompt construction for the intake conversation

use crate::parser::JSON_MARKER;
use crate::types::ExtractionRequest;
use saathi_domain::{missing_fields, FieldSpec, Role};

/// Builds the single prompt sent to the model for one turn
pub struct PromptBuilder<'a> {
    request: ExtractionRequest<'a>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(request: ExtractionRequest<'a>) -> Self {
        Self { request }
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        let schema = self.request.schema;
        let mut prompt = String::new();

        // 1. Persona and conversation rules
        prompt.push_str(ASSISTANT_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 2. The field set
        prompt.push_str("Required information:\n");
        push_fields(&mut prompt, schema.required());
        if schema.optional().next().is_some() {
            prompt.push_str("\nOptional information (collect if offered):\n");
            push_fields(&mut prompt, schema.optional());
        }
        prompt.push('\n');

        // 3. What is already known
        let snapshot = self.request.record.snapshot(schema);
        let known = serde_json::to_string_pretty(&snapshot).unwrap_or_else(|_| "{}".to_string());
        prompt.push_str("Details collected so far (do not ask for these again):\n");
        prompt.push_str(&known);
        prompt.push_str("\n\n");

        let missing = missing_fields(self.request.record, schema);
        if !missing.is_empty() {
            prompt.push_str(&format!("Still missing: {}\n\n", missing.join(", ")));
        }

        // 4. Recent conversation
        if !self.request.history.is_empty() {
            prompt.push_str("Conversation so far:\n");
            for turn in self.request.history {
                let speaker = match turn.role {
                    Role::User => "User",
                    Role::Assistant => "Saathi",
                };
                prompt.push_str(&format!("{}: {}\n", speaker, turn.content));
            }
            prompt.push('\n');
        }

        // 5. The message to answer
        prompt.push_str("Latest message from the user:\n");
        prompt.push_str("---\n");
        prompt.push_str(self.request.message);
        prompt.push_str("\n---\n\n");

        // 6. Output contract
        prompt.push_str(&self.output_format());

        prompt
    }

    fn output_format(&self) -> String {
        let template: Vec<String> = self
            .request
            .schema
            .fields()
            .iter()
            .map(|f| format!("  \"{}\": null", f.name))
            .collect();

        format!(
            "Output format:\n\
             First write your reply to the user in plain text.\n\
             Then write a line containing exactly {marker}\n\
             After it, write one JSON object with every field above as a key. \
             Use the value the user has given for a field, or null if it is not known. \
             Never invent values and never write anything after the JSON object.\n\n\
             Example:\n\
             Thank you for sharing that. Could you tell me where this happened?\n\
             {marker}\n\
             {{\n{fields}\n}}\n",
            marker = JSON_MARKER,
            fields = template.join(",\n"),
        )
    }
}

fn push_fields<'s>(prompt: &mut String, fields: impl Iterator<Item = &'s FieldSpec>) {
    for field in fields {
        prompt.push_str(&format!("- {}: {}\n", field.name, field.description));
    }
}

const ASSISTANT_INSTRUCTIONS: &str = r#"You are "Saathi", an empathetic digital assistant that helps people file a First Information Report (FIR) with the Indian Police.

Rules:
- Be calm, friendly and reassuring. Reporting an incident can be difficult.
- Reply in the language the user writes in.
- You are an AI assistant, not a police officer, and you cannot give legal advice.
- Ask for missing information a little at a time, never all at once.
- Start from what happened, then ask about date, time and place, then the complainant's details.
- Only record details the user has actually given. Do not guess.
- When every required detail is known, thank the user and tell them the information is ready to be submitted."#;
