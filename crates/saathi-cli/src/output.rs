//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use saathi_domain::{FieldSchema, RecordSnapshot, SubmissionReceipt};
use saathi_intake::SessionSnapshot;
use saathi_store::StoredSubmission;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the fields of a schema.
    pub fn format_schema(&self, schema: &FieldSchema) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(schema.to_pretty_json()?),
            OutputFormat::Quiet => Ok(schema
                .fields()
                .iter()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Group", "Description"]);
                for field in schema.fields() {
                    builder.push_record([
                        field.name.as_str(),
                        field.requirement.group_key().trim_end_matches("_fields"),
                        field.description.as_str(),
                    ]);
                }
                Ok(self.finish(builder))
            }
        }
    }

    /// Format the current state of a session.
    pub fn format_snapshot(&self, snapshot: &SessionSnapshot) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(snapshot)?),
            OutputFormat::Quiet => Ok(snapshot.missing_fields.join("\n")),
            OutputFormat::Table => {
                let table = self.record_table(&snapshot.record, &snapshot.missing_fields);
                let status = if snapshot.complete {
                    self.colorize("Ready to submit.", "green")
                } else {
                    self.colorize(
                        &format!("{} required field(s) missing.", snapshot.missing_fields.len()),
                        "yellow",
                    )
                };
                Ok(format!("{}\n{}", table, status))
            }
        }
    }

    /// Format the required fields still missing, with their descriptions.
    pub fn format_missing(&self, missing: &[String], schema: &FieldSchema) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(missing)?),
            OutputFormat::Quiet => Ok(missing.join("\n")),
            OutputFormat::Table => {
                if missing.is_empty() {
                    return Ok(self.success("All required fields are filled."));
                }
                let lines: Vec<String> = missing
                    .iter()
                    .map(|name| {
                        let description = schema.get(name).map(|f| f.description.as_str()).unwrap_or("");
                        format!("  {} - {}", self.colorize(name, "yellow"), description)
                    })
                    .collect();
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format a list of stored submissions.
    pub fn format_submissions(&self, submissions: &[StoredSubmission]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(submissions)?),
            OutputFormat::Quiet => Ok(submissions
                .iter()
                .map(|s| s.submission_id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if submissions.is_empty() {
                    return Ok(self.colorize("No submissions found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Session", "Submitted", "Fields"]);
                for submission in submissions {
                    builder.push_record([
                        submission.submission_id.to_string(),
                        submission.session_id.clone(),
                        submission.submitted_at.to_string(),
                        submission.record.len().to_string(),
                    ]);
                }
                Ok(self.finish(builder))
            }
        }
    }

    /// Format one stored submission in full.
    pub fn format_submission(
        &self,
        submission: &StoredSubmission,
        schema: &FieldSchema,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(submission)?),
            OutputFormat::Quiet => Ok(submission.submission_id.to_string()),
            OutputFormat::Table => {
                let header = self.info(&format!(
                    "Submission {} (session {}, at {})",
                    submission.submission_id, submission.session_id, submission.submitted_at
                ));
                let table = self.record_table(&submission.record.snapshot(schema), &[]);
                Ok(format!("{}\n{}", header, table))
            }
        }
    }

    /// Format the receipt of a finalized record.
    pub fn submitted(&self, receipt: &SubmissionReceipt) -> String {
        self.success(&format!("Report submitted: {}", receipt.submission_id))
    }

    /// Format a line spoken by the assistant.
    pub fn assistant(&self, text: &str) -> String {
        format!("{} {}", self.colorize("Saathi:", "cyan"), text)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn record_table(&self, record: &RecordSnapshot, missing: &[String]) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (name, value) in record.iter() {
            let shown = match value {
                Some(v) => v.to_string(),
                None if missing.iter().any(|m| m == name) => self.colorize("(missing)", "red"),
                None => "-".to_string(),
            };
            builder.push_record([name.to_string(), shown]);
        }
        self.finish(builder)
    }

    fn finish(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}
