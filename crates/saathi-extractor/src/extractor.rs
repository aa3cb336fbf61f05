//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::prompt::PromptBuilder;
use crate::types::ExtractionRequest;
use saathi_domain::traits::LlmProvider;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Sends one conversational turn to the model and returns its raw reply
///
/// The extractor never touches a record; callers interpret the reply with
/// [`crate::merge`] once it is returned.
pub struct Extractor<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    config: ExtractorConfig,
}

impl<L> Extractor<L>
where
    L: LlmProvider + 'static,
{
    /// Create a new Extractor
    pub fn new(llm_provider: L, config: ExtractorConfig) -> Self {
        Self::from_shared(Arc::new(llm_provider), config)
    }

    /// Create an Extractor around a provider shared with other components
    pub fn from_shared(llm_provider: Arc<L>, config: ExtractorConfig) -> Self {
        Self {
            llm_provider,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Name of the model behind the provider
    pub fn model_name(&self) -> &str {
        self.llm_provider.model_name()
    }

    /// Reject messages that are blank or longer than the configured limit
    pub fn check_message(&self, message: &str) -> Result<(), ExtractorError> {
        if message.trim().is_empty() {
            return Err(ExtractorError::EmptyMessage);
        }
        let length = message.chars().count();
        if length > self.config.max_message_length {
            return Err(ExtractorError::MessageTooLong(
                length,
                self.config.max_message_length,
            ));
        }
        Ok(())
    }

    /// Ask the model for the next reply
    ///
    /// Only the last `history_window` turns of `request.history` are sent.
    pub async fn extract(&self, request: ExtractionRequest<'_>) -> Result<String, ExtractorError> {
        self.check_message(request.message)?;

        let window = self.config.history_window;
        let history = &request.history[request.history.len().saturating_sub(window)..];
        let prompt = PromptBuilder::new(ExtractionRequest { history, ..request }).build();

        debug!(
            "Prompt length: {} chars, {} history turns",
            prompt.len(),
            history.len()
        );

        let started = Instant::now();
        let reply = timeout(
            self.config.extraction_timeout(),
            self.llm_provider.generate(&prompt),
        )
        .await
        .map_err(|_| {
            warn!(
                "Model {} did not answer within {}s",
                self.model_name(),
                self.config.extraction_timeout_secs
            );
            ExtractorError::Timeout(self.config.extraction_timeout_secs)
        })?
        .map_err(|e| ExtractorError::Llm(e.to_string()))?;

        if reply.trim().is_empty() {
            return Err(ExtractorError::EmptyReply);
        }

        info!(
            "Model {} replied with {} chars in {} ms",
            self.model_name(),
            reply.len(),
            started.elapsed().as_millis()
        );

        Ok(reply)
    }
}
