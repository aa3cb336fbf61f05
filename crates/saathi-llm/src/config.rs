//! Provider selection from configuration
//!
//! ```toml
//! [llm]
//! provider = "gemini"          # gemini | ollama | mock
//! model = "gemini-2.0-flash"
//! timeout_secs = 60
//! max_attempts = 2
//! ```
//!
//! The Gemini key is read from `api_key` or, when absent, from the
//! `GOOGLE_API_KEY` environment variable.

use crate::{GeminiProvider, LlmError, MockProvider, OllamaProvider, DEFAULT_MAX_ATTEMPTS};
use async_trait::async_trait;
use saathi_domain::traits::LlmProvider;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Reply used by the mock provider when nothing is scripted
pub const MOCK_REPLY: &str = "Thank you. Could you tell me a little more about what happened?\n---JSON---\n{}";

/// Which backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Gemini REST API
    Gemini,
    /// Local Ollama server
    Ollama,
    /// Canned replies, no network
    Mock,
}

/// LLM settings as found in a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Backend
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,

    /// Model name passed to the backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Override of the backend's API host
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Gemini API key; falls back to `GOOGLE_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Per-request HTTP timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per generation for transient failures
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Sampling temperature (Gemini only)
    #[serde(default)]
    pub temperature: Option<f32>,
}

fn default_provider() -> ProviderKind {
    ProviderKind::Gemini
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_timeout_secs() -> u64 {
    crate::DEFAULT_TIMEOUT_SECS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            endpoint: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            temperature: None,
        }
    }
}

impl LlmSettings {
    /// Settings for the offline mock backend
    pub fn mock() -> Self {
        Self {
            provider: ProviderKind::Mock,
            model: "mock".to_string(),
            ..Self::default()
        }
    }

    /// Construct the configured provider
    pub fn build(&self) -> Result<AnyProvider, LlmError> {
        let timeout = Duration::from_secs(self.timeout_secs.max(1));

        let provider = match self.provider {
            ProviderKind::Gemini => {
                let api_key = self
                    .api_key
                    .clone()
                    .filter(|k| !k.trim().is_empty())
                    .or_else(|| std::env::var(API_KEY_ENV).ok())
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| {
                        LlmError::Authentication(format!("{} is not set", API_KEY_ENV))
                    })?;

                let mut gemini = GeminiProvider::new(api_key, &self.model)
                    .with_timeout(timeout)
                    .with_max_attempts(self.max_attempts);
                if let Some(endpoint) = &self.endpoint {
                    gemini = gemini.with_endpoint(endpoint);
                }
                if let Some(temperature) = self.temperature {
                    gemini = gemini.with_temperature(temperature);
                }
                AnyProvider::Gemini(gemini)
            }
            ProviderKind::Ollama => {
                let endpoint = self
                    .endpoint
                    .as_deref()
                    .unwrap_or(crate::ollama::DEFAULT_ENDPOINT);
                AnyProvider::Ollama(
                    OllamaProvider::new(endpoint, &self.model)
                        .with_timeout(timeout)
                        .with_max_attempts(self.max_attempts),
                )
            }
            ProviderKind::Mock => AnyProvider::Mock(MockProvider::new(MOCK_REPLY)),
        };

        Ok(provider)
    }
}

/// Any of the built-in providers behind one type
pub enum AnyProvider {
    /// Google Gemini
    Gemini(GeminiProvider),
    /// Ollama
    Ollama(OllamaProvider),
    /// Mock
    Mock(MockProvider),
}

#[async_trait]
impl LlmProvider for AnyProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        match self {
            AnyProvider::Gemini(p) => p.generate(prompt).await,
            AnyProvider::Ollama(p) => p.generate(prompt).await,
            AnyProvider::Mock(p) => p.generate(prompt).await,
        }
    }

    fn model_name(&self) -> &str {
        match self {
            AnyProvider::Gemini(p) => p.model_name(),
            AnyProvider::Ollama(p) => p.model_name(),
            AnyProvider::Mock(p) => p.model_name(),
        }
    }
}
