//! HTTP request handlers

use super::types::{
    ChatRequest, ChatResponse, ErrorResponse, HistoryResponse, ModelsResponse, SessionResponse,
    StatusResponse, SuccessResponse, WebSearchRequest,
};
use super::AppState;
use crate::history::Message;
use crate::llm::LlmErrorKind;
use crate::session::DEFAULT_SESSION_ID;
use crate::state_machine::TurnFailure;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        // Single shared history, kept for existing clients
        .route("/web_search", post(web_search))
        .route("/api/sessions/new", post(create_session))
        .route("/api/sessions/:id", delete(delete_session))
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/history", get(get_history))
        .route("/api/sessions/:id/reset", post(reset_session))
        .route("/api/models", get(list_models))
        .with_state(state)
}

async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Hello, WebSearchAgent is live!".to_string(),
    })
}

// ============================================================
// Turns
// ============================================================

async fn web_search(
    State(state): State<AppState>,
    payload: Result<Json<WebSearchRequest>, JsonRejection>,
) -> Result<Json<Message>, AppError> {
    let Json(req) = payload?;
    let reply = run_turn(&state, DEFAULT_SESSION_ID, &req.search_input).await?;
    Ok(Json(reply.message))
}

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload?;
    let reply = run_turn(&state, &id, &req.text).await?;
    Ok(Json(ChatResponse {
        message: reply.message,
        history_len: reply.history_len,
    }))
}

async fn run_turn(
    state: &AppState,
    session_id: &str,
    text: &str,
) -> Result<crate::session::TurnReply, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("Message must not be empty".to_string()));
    }
    state
        .sessions
        .run_turn(state.engine.as_ref(), session_id, text)
        .await
        .map_err(AppError::Turn)
}

// ============================================================
// Session lifecycle
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(SessionResponse {
        session_id: state.sessions.create().await,
    })
}

async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, AppError> {
    let messages = state
        .sessions
        .history(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {id}")))?;
    Ok(Json(HistoryResponse { messages }))
}

async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    match state.sessions.reset(&id).await {
        Ok(true) => Ok(Json(SuccessResponse { success: true })),
        Ok(false) => Err(AppError::NotFound(format!("Session not found: {id}"))),
        Err(failure) => Err(AppError::Turn(failure)),
    }
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    match state.sessions.delete(&id).await {
        Ok(true) => Ok(Json(SuccessResponse { success: true })),
        Ok(false) => Err(AppError::NotFound(format!("Session not found: {id}"))),
        Err(failure) => Err(AppError::Turn(failure)),
    }
}

// ============================================================
// Model Info
// ============================================================

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.llm_registry.available_model_info(),
        default: state.llm_registry.default_model_id().to_string(),
    })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Turn(TurnFailure),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

fn failure_status(failure: &TurnFailure) -> StatusCode {
    match failure {
        TurnFailure::ResponderUnavailable { kind, .. } => match kind {
            LlmErrorKind::Network | LlmErrorKind::RateLimit => StatusCode::SERVICE_UNAVAILABLE,
            LlmErrorKind::ServerError
            | LlmErrorKind::Auth
            | LlmErrorKind::InvalidRequest
            | LlmErrorKind::Unknown => StatusCode::BAD_GATEWAY,
        },
        TurnFailure::SessionBusy => StatusCode::CONFLICT,
        TurnFailure::ToolLoopExceeded { .. } | TurnFailure::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg, "bad_request")),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new(msg, "not_found")),
            AppError::Turn(failure) => (
                failure_status(&failure),
                ErrorResponse::new(failure.to_string(), failure.reason()),
            ),
        };

        (status, Json(body)).into_response()
    }
}
