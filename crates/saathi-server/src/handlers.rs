//! HTTP request handlers

use crate::AppIntake;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router as AxumRouter,
};
use saathi_domain::{FieldSchema, SubmissionReceipt};
use saathi_intake::{DocumentReceipt, Greeting, IntakeError, SessionSnapshot, TurnOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Session-scoped conversation engine
    pub intake: Arc<AppIntake>,
}

impl AppState {
    /// Wrap an intake for the router
    pub fn new(intake: Arc<AppIntake>) -> Self {
        Self { intake }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy" when the server answers
    pub status: String,
    /// Live sessions
    pub sessions: usize,
    /// Model serving extraction
    pub model: String,
}

/// Body of `POST /sessions/:id/messages`
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageRequest {
    /// What the user typed
    pub text: String,
}

/// Body of `POST /sessions/:id/documents`
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentRequest {
    /// Name the file was uploaded under
    #[serde(default)]
    pub filename: String,
    /// Text already extracted from the file
    pub text: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error
    pub error: String,
    /// Required fields still missing, on an incomplete submission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_fields: Option<Vec<String>>,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Error raised by the intake
    Intake(IntakeError),
    /// Request body could not be decoded
    BadRequest(String),
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        AppError::Intake(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, missing_fields) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Intake(err) => {
                let message = err.to_string();
                match err {
                    IntakeError::InvalidInput(_) => (StatusCode::BAD_REQUEST, message, None),
                    IntakeError::UnknownSession(_) => (StatusCode::NOT_FOUND, message, None),
                    IntakeError::Incomplete { missing } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, message, Some(missing))
                    }
                    IntakeError::Extraction(_) => {
                        warn!("Extraction failed: {}", message);
                        (StatusCode::BAD_GATEWAY, message, None)
                    }
                    IntakeError::Config(_) => {
                        error!("Intake misconfigured: {}", message);
                        (StatusCode::INTERNAL_SERVER_ERROR, message, None)
                    }
                    IntakeError::Persistence(_) => {
                        error!("Submission failed: {}", message);
                        (StatusCode::BAD_GATEWAY, message, None)
                    }
                }
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            missing_fields,
        });
        (status, body).into_response()
    }
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        sessions: state.intake.sessions().len(),
        model: state.intake.model_name().to_string(),
    })
}

/// The field schema the assistant collects
async fn get_schema(State(state): State<AppState>) -> Json<FieldSchema> {
    Json(state.intake.schema().clone())
}

/// Open (or re-open) a session and return its greeting
async fn open_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Greeting>, AppError> {
    Ok(Json(state.intake.open_session(&session_id).await?))
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.intake.snapshot(&session_id).await?))
}

async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.intake.close(&session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Run one conversational turn
async fn post_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> Result<Json<TurnOutcome>, AppError> {
    let Json(request) = payload?;
    let outcome = state
        .intake
        .submit_message(&session_id, &request.text)
        .await?;
    Ok(Json(outcome))
}

/// Place already-extracted document text into the conversation
async fn post_document(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<DocumentRequest>, JsonRejection>,
) -> Result<Json<DocumentReceipt>, AppError> {
    let Json(request) = payload?;
    let receipt = state
        .intake
        .submit_extracted_document(&session_id, &request.filename, &request.text)
        .await?;
    Ok(Json(receipt))
}

/// Clear record and conversation, keep the session
async fn reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state.intake.reset(&session_id).await?;
    Ok(Json(state.intake.snapshot(&session_id).await?))
}

/// Hand a complete record to the submission store
async fn submit_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SubmissionReceipt>, AppError> {
    Ok(Json(state.intake.finalize(&session_id).await?))
}

/// Query parameters for `GET /submissions`
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Maximum rows, newest first
    #[serde(default = "default_list_limit")]
    pub limit: usize,
}

fn default_list_limit() -> usize {
    20
}

/// Recent submissions, newest first
async fn list_submissions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<SubmissionReceipt>>, AppError> {
    let sink = state.intake.sink();
    let rows = tokio::task::spawn_blocking(move || {
        let guard = sink.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.list_submissions(params.limit)
    })
    .await
    .map_err(|e| AppError::Intake(IntakeError::Persistence(e.to_string())))?
    .map_err(|e| AppError::Intake(IntakeError::Persistence(e.to_string())))?;
    Ok(Json(rows.iter().map(|row| row.receipt()).collect()))
}

/// Create the Axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/health", get(health_check))
        .route("/schema", get(get_schema))
        .route("/submissions", get(list_submissions))
        .route(
            "/sessions/:id",
            post(open_session).get(get_session).delete(close_session),
        )
        .route("/sessions/:id/messages", post(post_message))
        .route("/sessions/:id/documents", post(post_document))
        .route("/sessions/:id/reset", post(reset_session))
        .route("/sessions/:id/submit", post(submit_session))
        .with_state(state)
}
