//! HTTP Handlers

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use genui_core::{AgentError, ChatInput, DecisionState, Message, RunConfig};

use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

// ============================================================================
// Request / Response Types
// ============================================================================

/// Message list, either wrapped as `{"input": [...]}` or given directly
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InvokeInput {
    Wrapped(ChatInput),
    Bare(Vec<Message>),
}

impl InvokeInput {
    pub fn into_messages(self) -> Vec<Message> {
        match self {
            Self::Wrapped(chat) => chat.input,
            Self::Bare(messages) => messages,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InvokeRequest {
    pub input: InvokeInput,
    #[serde(default)]
    pub config: Option<RunConfig>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub inputs: Vec<InvokeInput>,
    #[serde(default)]
    pub config: Option<RunConfig>,
}

#[derive(Debug, Serialize)]
pub struct InvokeResponse {
    pub output: DecisionState,
    pub metadata: RunMetadata,
}

#[derive(Debug, Serialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub output: Vec<DecisionState>,
    pub metadata: BatchMetadata,
}

#[derive(Debug, Serialize)]
pub struct BatchMetadata {
    pub run_ids: Vec<Uuid>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub tools: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Map a fatal graph error onto a status and error body
pub fn error_response(err: &AgentError) -> (StatusCode, Json<ErrorResponse>) {
    let status = if matches!(err, AgentError::ToolValidation(_)) {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(ErrorResponse {
            error: err.user_message(),
            code: err.code().into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        tools: state
            .graph
            .tools()
            .names()
            .into_iter()
            .map(String::from)
            .collect(),
    })
}

/// Run one conversation through the decision graph
pub async fn invoke_handler(
    State(state): State<AppState>,
    Json(payload): Json<InvokeRequest>,
) -> ApiResult<InvokeResponse> {
    let config = payload.config.unwrap_or_default();
    let run_id = config.run_id;
    let messages = payload.input.into_messages();

    tracing::info!(%run_id, messages = messages.len(), "Invoke");

    let output = state
        .graph
        .invoke_input(messages, &config)
        .await
        .map_err(|e| {
            tracing::error!(%run_id, error = %e, "Graph invocation failed");
            error_response(&e)
        })?;

    Ok(Json(InvokeResponse {
        output,
        metadata: RunMetadata { run_id },
    }))
}

/// Run several independent conversations; any failure fails the batch
pub async fn batch_handler(
    State(state): State<AppState>,
    Json(payload): Json<BatchRequest>,
) -> ApiResult<BatchResponse> {
    let config = payload.config.unwrap_or_default();
    let inputs: Vec<Vec<Message>> = payload
        .inputs
        .into_iter()
        .map(InvokeInput::into_messages)
        .collect();

    tracing::info!(run_id = %config.run_id, inputs = inputs.len(), "Batch");

    let mut output = Vec::with_capacity(inputs.len());
    let mut run_ids = Vec::with_capacity(inputs.len());

    for (run_id, outcome) in state.graph.batch(inputs, &config).await {
        match outcome {
            Ok(final_state) => {
                output.push(final_state);
                run_ids.push(run_id);
            }
            Err(e) => {
                tracing::error!(%run_id, error = %e, "Batch item failed");
                return Err(error_response(&e));
            }
        }
    }

    Ok(Json(BatchResponse {
        output,
        metadata: BatchMetadata { run_ids },
    }))
}

fn message_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "role": {
                "type": "string",
                "enum": ["system", "user", "assistant", "tool", "human", "ai"],
                "description": "Message author; `type` is accepted as an alias"
            },
            "content": {"type": "string"},
            "name": {"type": "string"}
        },
        "required": ["role", "content"]
    })
}

/// JSON Schema of the chat input
pub async fn input_schema() -> Json<Value> {
    Json(json!({
        "title": "ChatInput",
        "type": "object",
        "properties": {
            "input": {"type": "array", "items": message_schema()}
        },
        "required": ["input"]
    }))
}

/// JSON Schema of the terminal decision state
pub async fn output_schema(State(state): State<AppState>) -> Json<Value> {
    let tool_names = state.graph.tools().names();

    Json(json!({
        "title": "DecisionState",
        "type": "object",
        "properties": {
            "input": {"type": "array", "items": message_schema()},
            "result": {"type": "string"},
            "tool_calls": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "enum": tool_names},
                        "arguments": {"type": "object"},
                        "id": {"type": "string"}
                    },
                    "required": ["name", "arguments"]
                }
            },
            "tool_result": {
                "anyOf": [{"type": "string"}, {"type": "object"}]
            }
        },
        "required": ["input"]
    }))
}

/// JSON Schema of the per-run configuration
pub async fn config_schema() -> Json<Value> {
    Json(json!({
        "title": "RunConfig",
        "type": "object",
        "properties": {
            "run_id": {"type": "string", "format": "uuid"},
            "run_name": {"type": "string"},
            "tags": {"type": "array", "items": {"type": "string"}},
            "metadata": {"type": "object"}
        }
    }))
}
