//! The intake service: one entry point per user-facing operation

use crate::error::IntakeError;
use crate::session::{SessionHandle, SessionStore};
use crate::types::{DocumentReceipt, Greeting, SessionSnapshot, TurnOutcome};
use saathi_domain::traits::{LlmProvider, RecordSink};
use saathi_domain::{FieldSchema, SubmissionReceipt};
use saathi_extractor::{merge, ExtractionRequest, Extractor, ExtractorConfig};
use saathi_gatekeeper::Gatekeeper;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Opening message logged once per session
pub const GREETING: &str = "Hello, I am Saathi, your digital assistant for filing an FIR. \
I understand this might be a difficult time, and I'm here to help you through the process \
step-by-step. To begin, could you please tell me about the incident you wish to report?";

/// Assistant turn logged after a document upload
pub const DOCUMENT_ACKNOWLEDGEMENT: &str = "Thank you for uploading the document. I've reviewed \
the content and will use this information to help with your FIR. Please let me know if there \
are any additional details you'd like to add or clarify about the incident.";

/// Used when a reply carries no text and every required field is known
pub const COMPLETION_MESSAGE: &str = "Thanks for providing all the details. Your information \
has been successfully collected for the FIR. Be assured, we will help you. The concerned \
authorities will be in touch.";

const MAX_SESSION_ID_LENGTH: usize = 128;

/// Conversational intake over a shared schema
///
/// Each session owns its record and conversation; different sessions run
/// concurrently and never see each other's state.
pub struct Intake<L, S>
where
    L: LlmProvider,
    S: RecordSink,
{
    schema: Arc<FieldSchema>,
    extractor: Extractor<L>,
    gatekeeper: Gatekeeper,
    sink: Arc<Mutex<S>>,
    sessions: SessionStore,
}

impl<L, S> Intake<L, S>
where
    L: LlmProvider + 'static,
    S: RecordSink,
{
    /// Create a new intake service
    ///
    /// Fails with [`IntakeError::Config`] when `config` does not validate.
    pub fn new(
        schema: Arc<FieldSchema>,
        llm_provider: L,
        sink: S,
        config: ExtractorConfig,
    ) -> Result<Self, IntakeError> {
        config.validate().map_err(IntakeError::Config)?;
        Ok(Self {
            gatekeeper: Gatekeeper::new(schema.clone()),
            extractor: Extractor::new(llm_provider, config),
            schema,
            sink: Arc::new(Mutex::new(sink)),
            sessions: SessionStore::new(),
        })
    }

    /// Use `sessions` instead of a private store (to share it with a janitor)
    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    /// Schema being collected
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Live sessions
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Shared record sink
    pub fn sink(&self) -> Arc<Mutex<S>> {
        self.sink.clone()
    }

    /// Name of the model behind the extractor
    pub fn model_name(&self) -> &str {
        self.extractor.model_name()
    }

    /// Start (or rejoin) a session and get its greeting
    ///
    /// The greeting is logged as an assistant turn the first time only.
    pub async fn open_session(&self, session_id: &str) -> Result<Greeting, IntakeError> {
        validate_session_id(session_id)?;
        let handle = self.sessions.get_or_create(session_id);
        let mut session = handle.lock().await;
        session.touch();

        if !session.greeted() {
            session.log_mut().append_assistant(GREETING);
            session.mark_greeted();
            info!("Greeted session {}", session_id);
        }

        Ok(Greeting {
            session_id: session_id.to_string(),
            message: GREETING.to_string(),
        })
    }

    /// Process one user message
    ///
    /// The user turn is logged even when extraction fails; the record only
    /// changes when the model reply carries usable values.
    pub async fn submit_message(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<TurnOutcome, IntakeError> {
        validate_session_id(session_id)?;
        self.extractor.check_message(text)?;

        let handle = self.sessions.get_or_create(session_id);
        let mut session = handle.lock().await;
        session.touch();

        let result = self
            .extractor
            .extract(ExtractionRequest {
                schema: &self.schema,
                record: session.record(),
                history: session.log().turns(),
                message: text,
            })
            .await;

        session.log_mut().append_user(text);
        session.touch();

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Turn failed for session {}: {}", session_id, e);
                return Err(e.into());
            }
        };

        let outcome = merge(&reply, &self.schema, session.record_mut());
        let readiness = self.gatekeeper.evaluate(session.record());

        let display_text = if outcome.display_text.is_empty() {
            self.fallback_reply(&readiness.missing)
        } else {
            outcome.display_text
        };
        session.log_mut().append_assistant(display_text.clone());

        info!(
            "Session {}: {} fields updated, {} required missing",
            session_id,
            outcome.report.updated.len(),
            readiness.missing.len()
        );

        Ok(TurnOutcome {
            display_text,
            record: session.record().snapshot(&self.schema),
            complete: readiness.is_ready(),
            missing_fields: readiness.missing,
            updated_fields: outcome.report.updated,
            ignored_fields: outcome.report.ignored,
            diagnostic: outcome.diagnostic,
        })
    }

    /// Place the text of an uploaded document into the conversation
    ///
    /// No model call is made; the next message sees the document in its
    /// history window.
    pub async fn submit_extracted_document(
        &self,
        session_id: &str,
        filename: &str,
        extracted_text: &str,
    ) -> Result<DocumentReceipt, IntakeError> {
        validate_session_id(session_id)?;
        if extracted_text.trim().is_empty() {
            return Err(IntakeError::InvalidInput("Document has no text".to_string()));
        }
        let filename = match filename.trim() {
            "" => "document",
            name => name,
        };

        let limit = self.extractor.config().max_document_length;
        let total = extracted_text.chars().count();
        let content: String = extracted_text.chars().take(limit).collect();
        let truncated = total > limit;
        if truncated {
            warn!(
                "Document {} truncated from {} to {} chars",
                filename, total, limit
            );
        }

        let handle = self.sessions.get_or_create(session_id);
        let mut session = handle.lock().await;
        session.touch();
        session.log_mut().append_user(format!(
            "I have uploaded a document: {}. Here is the content:\n\n{}",
            filename, content
        ));
        session.log_mut().append_assistant(DOCUMENT_ACKNOWLEDGEMENT);

        info!("Session {}: document {} added", session_id, filename);

        Ok(DocumentReceipt {
            filename: filename.to_string(),
            characters: total.min(limit),
            truncated,
            acknowledgement: DOCUMENT_ACKNOWLEDGEMENT.to_string(),
        })
    }

    /// Current state of a session
    pub async fn snapshot(&self, session_id: &str) -> Result<SessionSnapshot, IntakeError> {
        let handle = self.existing(session_id)?;
        let session = handle.lock().await;
        let readiness = self.gatekeeper.evaluate(session.record());

        Ok(SessionSnapshot {
            session_id: session_id.to_string(),
            record: session.record().snapshot(&self.schema),
            complete: readiness.is_ready(),
            missing_fields: readiness.missing,
            turn_count: session.log().len(),
            last_active: session.last_active(),
        })
    }

    /// Hand a complete record to the sink
    ///
    /// The session and its record are kept either way.
    ///
    /// The sink runs on the blocking pool; the session stays locked until it
    /// returns so no turn can change the record mid-submit.
    pub async fn finalize(&self, session_id: &str) -> Result<SubmissionReceipt, IntakeError>
    where
        S: Send + 'static,
    {
        let handle = self.existing(session_id)?;
        let mut session = handle.lock().await;
        session.touch();

        let record = session.record().clone();
        let owner = session_id.to_string();
        let gatekeeper = self.gatekeeper.clone();
        let sink = self.sink.clone();
        let receipt = tokio::task::spawn_blocking(move || {
            let mut sink = sink
                .lock()
                .map_err(|_| IntakeError::Persistence("Record sink is unavailable".to_string()))?;
            gatekeeper
                .submit(&owner, &record, &mut *sink)
                .map_err(IntakeError::from)
        })
        .await
        .map_err(|e| IntakeError::Persistence(format!("Submission task failed: {}", e)))??;

        Ok(receipt)
    }

    /// Forget the record and conversation of a session
    pub async fn reset(&self, session_id: &str) -> Result<(), IntakeError> {
        let handle = self.existing(session_id)?;
        let mut session = handle.lock().await;
        session.reset();
        session.touch();
        info!("Reset session {}", session_id);
        Ok(())
    }

    /// End a session
    pub fn close(&self, session_id: &str) -> Result<(), IntakeError> {
        if self.sessions.remove(session_id) {
            Ok(())
        } else {
            Err(IntakeError::UnknownSession(session_id.to_string()))
        }
    }

    fn existing(&self, session_id: &str) -> Result<SessionHandle, IntakeError> {
        self.sessions
            .get(session_id)
            .ok_or_else(|| IntakeError::UnknownSession(session_id.to_string()))
    }

    fn fallback_reply(&self, missing: &[String]) -> String {
        let next = missing.first().and_then(|name| self.schema.get(name));
        match next {
            Some(field) => format!(
                "Thank you. Could you also tell me the {}?",
                field.description.to_lowercase()
            ),
            None => COMPLETION_MESSAGE.to_string(),
        }
    }
}

fn validate_session_id(session_id: &str) -> Result<(), IntakeError> {
    if session_id.trim().is_empty() {
        return Err(IntakeError::InvalidInput("Session id is empty".to_string()));
    }
    if session_id.len() > MAX_SESSION_ID_LENGTH {
        return Err(IntakeError::InvalidInput(format!(
            "Session id longer than {} bytes",
            MAX_SESSION_ID_LENGTH
        )));
    }
    Ok(())
}
