//! Error Types

use thiserror::Error;

/// Result type alias for graph and tool operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Fatal errors raised while driving the decision graph.
///
/// Recoverable tool failures never show up here; adapters report those as
/// [`ToolOutput::Message`](crate::tool::ToolOutput) instead.
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error (transport, HTTP status, undecodable body)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Model replied with something other than an assistant message
    #[error("Invalid result from model. Expected assistant message, got {0}.")]
    InvalidModelResult(String),

    /// State reached a step without the fields that step needs
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool validation failed
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Required credential is not configured
    #[error("Missing {0} secret.")]
    MissingCredential(String),

    /// Parse error (e.g., tool call arguments)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The AI service encountered an error: {msg}"),
            Self::InvalidModelResult(_) => "The AI service returned an unexpected reply.".into(),
            Self::InvalidState(msg) => format!("The request could not be routed: {msg}"),
            Self::ToolNotFound(name) => format!("The tool '{name}' is not available."),
            Self::ToolValidation(msg) => format!("Invalid tool input: {msg}"),
            Self::MissingCredential(_) => "A required service credential is not configured.".into(),
            Self::Parse(msg) => format!("Could not read the model's tool request: {msg}"),
            Self::Config(_) | Self::Json(_) => "An unexpected error occurred.".into(),
        }
    }

    /// Stable machine-readable code for API error bodies
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Provider(_) => "PROVIDER_ERROR",
            Self::InvalidModelResult(_) => "INVALID_MODEL_RESULT",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::ToolNotFound(_) => "TOOL_NOT_FOUND",
            Self::ToolValidation(_) => "TOOL_VALIDATION",
            Self::MissingCredential(_) => "MISSING_CREDENTIAL",
            Self::Parse(_) => "PARSE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}
