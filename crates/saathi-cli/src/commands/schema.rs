//! Schema command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the schema command.
pub fn execute_schema(config: &Config, formatter: &Formatter) -> Result<()> {
    let schema = config.load_schema()?;
    println!("{}", formatter.format_schema(&schema)?);
    Ok(())
}
