//! Chat command implementation.

use crate::cli::ChatArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use crate::repl;
use saathi_domain::unix_timestamp;
use saathi_intake::Intake;
use saathi_llm::AnyProvider;
use saathi_store::SqliteSink;
use std::sync::Arc;

/// Intake running inside the CLI process.
pub type CliIntake = Intake<AnyProvider, SqliteSink>;

/// Build an intake from the CLI configuration.
pub fn build_intake(config: &Config) -> Result<CliIntake> {
    let schema = Arc::new(config.load_schema()?);
    let llm = config.llm.build()?;
    let sink = config.open_store()?;
    Ok(Intake::new(schema, llm, sink, config.extractor.clone())?)
}

/// Execute the chat command.
pub async fn execute_chat(args: ChatArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let intake = build_intake(config)?;
    let session_id = args
        .session
        .unwrap_or_else(|| format!("cli-{}", unix_timestamp()));

    repl::run_repl(&intake, &session_id, formatter).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use saathi_llm::LlmSettings;
    use tempfile::TempDir;

    fn mock_config(dir: &TempDir) -> Config {
        Config {
            database_path: dir.path().join("saathi.db"),
            llm: LlmSettings::mock(),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_local_intake_runs_a_turn() {
        let dir = TempDir::new().unwrap();
        let intake = build_intake(&mock_config(&dir)).unwrap();
        assert_eq!(intake.model_name(), "mock");

        intake.open_session("local").await.unwrap();
        let outcome = intake.submit_message("local", "Hello").await.unwrap();
        assert!(!outcome.display_text.is_empty());
        assert!(!outcome.complete);
    }

    #[test]
    fn test_missing_schema_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            schema_path: Some(dir.path().join("absent.json")),
            ..mock_config(&dir)
        };
        assert!(matches!(build_intake(&config), Err(crate::CliError::Schema(_))));
    }
}
