//! Configuration file parsing for the server.
//!
//! Loads the bind address, database location, optional schema file and the
//! `[extractor]`, `[janitor]` and `[llm]` tables from TOML.

use saathi_extractor::ExtractorConfig;
use saathi_janitor::JanitorConfig;
use saathi_llm::LlmSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// SQLite file for submissions (":memory:" for a throwaway store)
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Schema document; the embedded FIR template when absent
    #[serde(default)]
    pub schema_path: Option<PathBuf>,

    /// Extraction settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Idle session eviction
    #[serde(default)]
    pub janitor: JanitorConfig,

    /// Model backend
    #[serde(default)]
    pub llm: LlmSettings,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    8080
}

fn default_database_path() -> PathBuf {
    PathBuf::from("saathi.db")
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the nested component settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.extractor
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("[extractor] {}", e)))?;
        self.janitor
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("[janitor] {}", e)))?;
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("[llm] model must not be empty".to_string()));
        }
        Ok(())
    }

    /// Create a default configuration for testing: mock model, in-memory store
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            database_path: PathBuf::from(":memory:"),
            schema_path: None,
            extractor: ExtractorConfig::default(),
            janitor: JanitorConfig::default(),
            llm: LlmSettings::mock(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
