//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Number of trailing turns included in each prompt
    pub history_window: usize,

    /// Maximum time for a single extraction call (seconds)
    pub extraction_timeout_secs: u64,

    /// Maximum length of one user message (characters)
    pub max_message_length: usize,

    /// Maximum length of injected document text (characters)
    pub max_document_length: usize,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.history_window == 0 {
            return Err("history_window must be greater than 0".to_string());
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        if self.max_message_length == 0 {
            return Err("max_message_length must be greater than 0".to_string());
        }
        if self.max_document_length == 0 {
            return Err("max_document_length must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Aggressive preset: short context and tight timeouts for small models
    pub fn aggressive() -> Self {
        Self {
            history_window: 6,
            extraction_timeout_secs: 30,
            max_message_length: 2_000,
            max_document_length: 8_000,
        }
    }

    /// Lenient preset: long context and generous timeouts
    pub fn lenient() -> Self {
        Self {
            history_window: 24,
            extraction_timeout_secs: 180,
            max_message_length: 8_000,
            max_document_length: 50_000,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            history_window: 12,
            extraction_timeout_secs: 60,
            max_message_length: 4_000,
            max_document_length: 20_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::default().validate().is_ok());
        assert!(ExtractorConfig::aggressive().validate().is_ok());
        assert!(ExtractorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_history_window() {
        let config = ExtractorConfig {
            history_window: 0,
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let config = ExtractorConfig {
            extraction_timeout_secs: 0,
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml("history_window = 4").unwrap();
        assert_eq!(config.history_window, 4);
        assert_eq!(config.extraction_timeout_secs, 60);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::lenient();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
