//! HTTP Handlers

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use agent_core::{AgentError, ToolCall, ToolResult, ToolSchema};
use lexicon_tools::session::DocumentMeta;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub document_source: String,
    pub change_order_service: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Serialize)]
pub struct SessionStatus {
    pub document: Option<DocumentMeta>,
    pub pending: Vec<String>,
    pub applied: usize,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: &AgentError) -> ApiError {
    let (status, code) = match err {
        AgentError::ToolNotFound(_) => (StatusCode::NOT_FOUND, "TOOL_NOT_FOUND"),
        AgentError::ToolValidation(_) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENTS"),
    };
    tracing::warn!(%err, "Rejected tool call");

    (
        status,
        Json(ErrorResponse {
            error: err.user_message(),
            code: code.into(),
        }),
    )
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        document_source: state.source_name.clone(),
        change_order_service: state.change_order_name.clone(),
    })
}

/// Schemas of every registered tool
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolSchema>> {
    Json(state.tools.schemas())
}

/// Execute a tool with the request body as its arguments
pub async fn execute_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(arguments): Json<HashMap<String, Value>>,
) -> Result<Json<ToolResult>, ApiError> {
    let call = ToolCall {
        name,
        arguments,
        id: None,
    };

    state.tools.execute(&call).await.map(Json).map_err(|e| api_error(&e))
}

/// What the shared session currently holds
pub async fn session_status(State(state): State<AppState>) -> Json<SessionStatus> {
    let session = state.session.read().await;
    Json(SessionStatus {
        document: session.meta().ok().cloned(),
        pending: session.pending_ids(),
        applied: session.history().len(),
    })
}
