//! Saathi CLI library.
//!
//! Terminal front end for the intake assistant: an interactive chat that
//! fills the report, plus commands to inspect the schema and stored
//! submissions.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod repl;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
