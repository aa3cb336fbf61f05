//! Saathi HTTP Server
//!
//! Exposes the intake operations over a JSON API and runs the idle-session
//! janitor next to it.
//!
//! # Routes
//!
//! - `GET /health`: liveness, live session count and model name
//! - `GET /schema`: the field schema being collected
//! - `POST /sessions/:id`: open a session and get its greeting
//! - `GET /sessions/:id`: record snapshot and missing fields
//! - `DELETE /sessions/:id`: end a session
//! - `POST /sessions/:id/messages`: one conversational turn
//! - `POST /sessions/:id/documents`: inject extracted document text
//! - `POST /sessions/:id/reset`: clear record and conversation
//! - `POST /sessions/:id/submit`: finalize a complete record
//! - `GET /submissions`: recent submissions

pub mod config;
pub mod handlers;

pub use config::{ConfigError, ServerConfig};
pub use handlers::{create_router, AppState};

use saathi_domain::{FieldSchema, SchemaError};
use saathi_intake::{Intake, IntakeError};
use saathi_janitor::{JanitorError, JanitorWorker};
use saathi_llm::{AnyProvider, LlmError};
use saathi_store::{SqliteSink, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Intake wired to the configured model and the SQLite store
pub type AppIntake = Intake<AnyProvider, SqliteSink>;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "saathi=info";

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Schema could not be loaded
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Submission store could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Model backend could not be built
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Intake rejected its settings
    #[error("Intake error: {0}")]
    Intake(#[from] IntakeError),

    /// Janitor rejected its settings
    #[error("Janitor error: {0}")]
    Janitor(#[from] JanitorError),

    /// Failed to bind to address
    #[error("Failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    /// Server runtime error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the fmt subscriber, filtered by `RUST_LOG` or [`DEFAULT_LOG_FILTER`]
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Load the configured schema, or the embedded FIR template
pub fn load_schema(config: &ServerConfig) -> Result<FieldSchema, SchemaError> {
    match &config.schema_path {
        Some(path) => FieldSchema::from_file(path),
        None => FieldSchema::fir_default(),
    }
}

/// Build the intake described by `config`
pub fn build_intake(config: &ServerConfig) -> Result<AppIntake, ServerError> {
    let schema = Arc::new(load_schema(config)?);
    let llm = config.llm.build()?;
    let sink = SqliteSink::new(&config.database_path)?;

    tracing::info!(
        "Collecting {} fields with model {} (store: {})",
        schema.len(),
        config.llm.model,
        config.database_path.display()
    );

    Ok(Intake::new(schema, llm, sink, config.extractor.clone())?)
}

/// Start the HTTP server with the given configuration
///
/// Runs until Ctrl+C, then stops the janitor and returns.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    config.validate()?;
    let intake = Arc::new(build_intake(&config)?);

    let mut worker = JanitorWorker::new(config.janitor.clone())?;
    let sessions = intake.sessions().clone();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let janitor = tokio::spawn(async move {
        worker
            .run_until(sessions, async {
                let _ = stop_rx.await;
            })
            .await;
    });

    let app = create_router(AppState::new(intake));
    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Saathi server listening on {}", bind_addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Server(e.to_string()));

    let _ = stop_tx.send(());
    if let Err(e) = janitor.await {
        tracing::error!("Janitor task failed: {}", e);
    }

    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_intake_from_test_config() {
        let config = ServerConfig::default_test_config();
        let intake = build_intake(&config).unwrap();
        assert_eq!(intake.model_name(), "mock");
        assert!(intake.schema().contains("complainant_name"));
    }

    #[test]
    fn test_missing_schema_file() {
        let mut config = ServerConfig::default_test_config();
        config.schema_path = Some("/nonexistent/schema.json".into());
        assert!(matches!(
            build_intake(&config),
            Err(ServerError::Schema(SchemaError::Io(_)))
        ));
    }
}
