//! Saathi Server CLI
//!
//! Starts the HTTP server for conversational FIR intake.

use saathi_server::{config::ServerConfig, init_tracing, start_server, ServerError};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    // GOOGLE_API_KEY and RUST_LOG may come from a .env file
    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Warning: No config file specified, using default test configuration");
        eprintln!("Usage: saathi-server --config <path-to-config.toml>");
        eprintln!();
        ServerConfig::default_test_config()
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Saathi Server - Conversational FIR intake");
    println!();
    println!("USAGE:");
    println!("    saathi-server --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("EXAMPLE:");
    println!("    saathi-server --config config/server.toml");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file may contain:");
    println!("    - bind_address, bind_port: where to listen (default 127.0.0.1:8080)");
    println!("    - database_path: SQLite file for submissions");
    println!("    - schema_path: JSON field schema (default: built-in FIR template)");
    println!("    - [extractor]: history_window, extraction_timeout_secs, ...");
    println!("    - [janitor]: idle_timeout_secs, sweep_interval_secs, dry_run");
    println!("    - [llm]: provider (gemini|ollama|mock), model, endpoint");
    println!();
    println!("ENVIRONMENT:");
    println!("    GOOGLE_API_KEY     API key for the gemini provider");
    println!("    RUST_LOG           Log filter (default: saathi=info)");
    println!();
}
