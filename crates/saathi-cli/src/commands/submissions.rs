//! Submission listing and lookup.

use crate::cli::{ShowArgs, SubmissionsArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use saathi_domain::SubmissionId;
use saathi_store::{SqliteSink, StoredSubmission};

/// Execute the submissions command.
pub fn execute_submissions(
    args: SubmissionsArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let store = config.open_store()?;
    let submissions = store.list_submissions(args.limit)?;
    println!("{}", formatter.format_submissions(&submissions)?);
    Ok(())
}

/// Execute the show command.
pub fn execute_show(args: ShowArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = config.open_store()?;
    let submission = find_submission(&store, &args.id)?;
    let schema = config.load_schema()?;
    println!("{}", formatter.format_submission(&submission, &schema)?);
    Ok(())
}

fn find_submission(store: &SqliteSink, id: &str) -> Result<StoredSubmission> {
    let id = SubmissionId::parse(id.trim()).map_err(CliError::InvalidInput)?;
    store
        .get_submission(&id)?
        .ok_or_else(|| CliError::NotFound(format!("submission {}", id)))
}
