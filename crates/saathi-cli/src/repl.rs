//! Interactive chat loop.
//!
//! Plain lines are sent to the assistant. Lines starting with `:` are local
//! commands.

use crate::commands::CliIntake;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use saathi_intake::IntakeError;
use std::path::{Path, PathBuf};

/// One parsed line of input.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplInput {
    /// Text for the assistant
    Message(String),
    /// Show the record so far
    Record,
    /// Show required fields still missing
    Missing,
    /// Finalize the record
    Submit,
    /// Start the report over
    Reset,
    /// Add a text document to the conversation
    Document(PathBuf),
    /// Show help
    Help,
    /// Leave the chat
    Quit,
}

/// Run the chat for `session_id` until `:quit` or end of input.
pub async fn run_repl(intake: &CliIntake, session_id: &str, formatter: &Formatter) -> Result<()> {
    println!(
        "{}",
        formatter.info(&format!("Session {} - type :help for commands, :quit to leave", session_id))
    );
    println!();

    let greeting = intake.open_session(session_id).await?;
    println!("{}", formatter.assistant(&greeting.message));

    let mut editor = DefaultEditor::new().map_err(|e| {
        CliError::Io(std::io::Error::other(format!("Failed to initialize editor: {}", e)))
    })?;

    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    loop {
        match editor.readline("you> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_repl_line(line) {
                    Ok(ReplInput::Quit) => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    Ok(ReplInput::Help) => print_help(formatter),
                    Ok(input) => {
                        if let Err(e) = execute_input(input, intake, session_id, formatter).await {
                            eprintln!("{}", formatter.error(&e.to_string()));
                        }
                    }
                    Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use :quit to leave"));
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();
    Ok(())
}

/// Parse a line of chat input.
pub fn parse_repl_line(line: &str) -> Result<ReplInput> {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return Ok(ReplInput::Message(line.to_string()));
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };

    match name {
        "quit" | "exit" | "q" => Ok(ReplInput::Quit),
        "help" | "?" => Ok(ReplInput::Help),
        "record" => Ok(ReplInput::Record),
        "missing" => Ok(ReplInput::Missing),
        "submit" => Ok(ReplInput::Submit),
        "reset" => Ok(ReplInput::Reset),
        "doc" if rest.is_empty() => Err(CliError::InvalidInput("Usage: :doc <path>".to_string())),
        "doc" => Ok(ReplInput::Document(PathBuf::from(rest))),
        _ => Err(CliError::InvalidInput(format!(
            "Unknown command: :{}. Type :help for available commands.",
            name
        ))),
    }
}

async fn execute_input(
    input: ReplInput,
    intake: &CliIntake,
    session_id: &str,
    formatter: &Formatter,
) -> Result<()> {
    match input {
        ReplInput::Message(text) => {
            let outcome = intake.submit_message(session_id, &text).await?;
            println!("{}", formatter.assistant(&outcome.display_text));
            if let Some(diagnostic) = outcome.diagnostic {
                println!(
                    "{}",
                    formatter.warning(&format!("No details recorded from that reply ({})", diagnostic))
                );
            } else if !outcome.updated_fields.is_empty() {
                println!(
                    "{}",
                    formatter.info(&format!("Recorded: {}", outcome.updated_fields.join(", ")))
                );
            }
            if outcome.complete {
                println!(
                    "{}",
                    formatter.info("All required details are in. Type :submit to file the report.")
                );
            }
        }
        ReplInput::Record => {
            let snapshot = intake.snapshot(session_id).await?;
            println!("{}", formatter.format_snapshot(&snapshot)?);
        }
        ReplInput::Missing => {
            let snapshot = intake.snapshot(session_id).await?;
            println!("{}", formatter.format_missing(&snapshot.missing_fields, intake.schema())?);
        }
        ReplInput::Submit => match intake.finalize(session_id).await {
            Ok(receipt) => println!("{}", formatter.submitted(&receipt)),
            Err(IntakeError::Incomplete { missing }) => {
                println!("{}", formatter.warning("The report cannot be filed yet. Still needed:"));
                println!("{}", formatter.format_missing(&missing, intake.schema())?);
            }
            Err(e) => return Err(e.into()),
        },
        ReplInput::Reset => {
            intake.reset(session_id).await?;
            println!("{}", formatter.success("Started over"));
            let greeting = intake.open_session(session_id).await?;
            println!("{}", formatter.assistant(&greeting.message));
        }
        ReplInput::Document(path) => {
            let text = std::fs::read_to_string(&path)?;
            let receipt = intake
                .submit_extracted_document(session_id, &file_label(&path), &text)
                .await?;
            println!("{}", formatter.assistant(&receipt.acknowledgement));
            if receipt.truncated {
                println!(
                    "{}",
                    formatter.warning(&format!(
                        "Only the first {} characters were kept",
                        receipt.characters
                    ))
                );
            }
        }
        ReplInput::Help | ReplInput::Quit => {}
    }

    Ok(())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn get_history_path() -> Result<PathBuf> {
    let dir = Config::home()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("history.txt"))
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Type your answers in plain words. Commands:"));
    println!();
    println!("  :record        - Show the details collected so far");
    println!("  :missing       - Show required details still missing");
    println!("  :doc <path>    - Add a text document (e.g. a written statement)");
    println!("  :submit        - File the report once it is complete");
    println!("  :reset         - Forget everything and start over");
    println!("  :help, :?      - Show this help");
    println!("  :quit, :q      - Leave the chat");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(
            parse_repl_line("  my phone was stolen  ").unwrap(),
            ReplInput::Message("my phone was stolen".to_string())
        );
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse_repl_line(":record").unwrap(), ReplInput::Record);
        assert_eq!(parse_repl_line(":missing").unwrap(), ReplInput::Missing);
        assert_eq!(parse_repl_line(":submit").unwrap(), ReplInput::Submit);
        assert_eq!(parse_repl_line(":q").unwrap(), ReplInput::Quit);
        assert_eq!(parse_repl_line(":?").unwrap(), ReplInput::Help);
    }

    #[test]
    fn test_doc_takes_rest_of_line_as_path() {
        assert_eq!(
            parse_repl_line(":doc  statements/my statement.txt").unwrap(),
            ReplInput::Document(PathBuf::from("statements/my statement.txt"))
        );
        assert!(matches!(parse_repl_line(":doc"), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(parse_repl_line(":frobnicate"), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_file_label() {
        assert_eq!(file_label(Path::new("/tmp/fir/statement.txt")), "statement.txt");
        assert_eq!(file_label(Path::new("/")), "");
    }
}
