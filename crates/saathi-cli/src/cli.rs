//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};

/// Saathi CLI - File a police complaint by talking it through.
#[derive(Debug, Parser)]
#[command(name = "saathi")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SAATHI_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs and names only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start an interactive intake conversation
    Chat(ChatArgs),

    /// Print the fields the assistant collects
    Schema,

    /// List stored submissions, newest first
    Submissions(SubmissionsArgs),

    /// Show one stored submission
    Show(ShowArgs),
}

/// Arguments for the chat command.
#[derive(Debug, Default, Parser)]
pub struct ChatArgs {
    /// Session id (default: generated)
    #[arg(short, long)]
    pub session: Option<String>,
}

/// Arguments for the submissions command.
#[derive(Debug, Parser)]
pub struct SubmissionsArgs {
    /// Maximum number of results
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Submission id
    pub id: String,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
