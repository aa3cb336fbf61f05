//! Saathi CLI - conversational FIR intake from the terminal.

use saathi_cli::commands;
use saathi_cli::{Cli, Command, Config, Formatter};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> saathi_cli::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from(Path::new(path))?,
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("Warning: {}; using default configuration", e);
            Config::default()
        }),
    };

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        None => {
            commands::execute_chat(Default::default(), &config, &formatter).await?;
        }
        Some(Command::Chat(args)) => {
            commands::execute_chat(args, &config, &formatter).await?;
        }
        Some(Command::Schema) => {
            commands::execute_schema(&config, &formatter)?;
        }
        Some(Command::Submissions(args)) => {
            commands::execute_submissions(args, &config, &formatter)?;
        }
        Some(Command::Show(args)) => {
            commands::execute_show(args, &config, &formatter)?;
        }
    }

    Ok(())
}

/// Log to stderr so chat output stays readable; quiet unless `RUST_LOG` is set
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
