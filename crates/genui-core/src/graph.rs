//! Decision Graph
//!
//! Two steps and one conditional branch:
//!
//! ```text
//!   invoke_model ──route──▶ Terminate ──▶ END
//!                    │
//!                    └────▶ invoke_tools ──▶ END
//! ```
//!
//! The model step decides between a plain answer and tool calls, [`route`]
//! picks the branch, and the tool step runs the first requested call.
//! There are no cycles.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AgentError, Result};
use crate::message::{Message, Role};
use crate::provider::{GenerationOptions, LlmProvider, RawToolCall};
use crate::state::{DecisionState, StateUpdate};
use crate::tool::{ToolCall, ToolRegistry};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. You're provided a list of tools, and an input from the user.\n\
Your job is to determine whether or not you have a tool which can handle the users input, or respond with plain text.";

/// Per-invocation execution configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "Uuid::new_v4")]
    pub run_id: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_name: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            run_name: None,
            tags: Vec::new(),
            metadata: HashMap::new(),
        }
    }
}

impl RunConfig {
    /// Same settings under a fresh run id
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            ..self.clone()
        }
    }
}

/// Graph nodes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Node {
    InvokeModel,
    InvokeTools,
}

impl Node {
    pub const fn id(self) -> &'static str {
        match self {
            Self::InvokeModel => "invoke_model",
            Self::InvokeTools => "invoke_tools",
        }
    }
}

/// Outcome of the conditional edge after the model step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Terminate,
    InvokeTools,
}

/// Pick the branch after the model step.
///
/// A text result ends the run; a non-empty list of tool calls goes to the
/// tool step. Anything else is an invalid state.
pub fn route(state: &DecisionState) -> Result<Route> {
    if state.result.is_some() {
        return Ok(Route::Terminate);
    }
    match &state.tool_calls {
        Some(calls) if !calls.is_empty() => Ok(Route::InvokeTools),
        _ => Err(AgentError::InvalidState(
            "no result or tool calls found".into(),
        )),
    }
}

/// Model invocation step
pub struct ModelInvocation {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    options: GenerationOptions,
    system_prompt: String,
}

impl ModelInvocation {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        options: GenerationOptions,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            tools,
            options,
            system_prompt: system_prompt.into(),
        }
    }

    /// Ask the model, return either `result` or `tool_calls`
    pub async fn run(&self, state: &DecisionState, config: &RunConfig) -> Result<StateUpdate> {
        let mut messages = Vec::with_capacity(state.input.len() + 1);
        messages.push(Message::system(&self.system_prompt));
        messages.extend(state.input.iter().cloned());

        tracing::debug!(
            run_id = %config.run_id,
            messages = state.input.len(),
            provider = self.provider.name(),
            "Invoking model"
        );

        let completion = self
            .provider
            .complete(&messages, &self.tools.schemas(), &self.options)
            .await?;

        if completion.role != Role::Assistant {
            return Err(AgentError::InvalidModelResult(completion.role.to_string()));
        }

        if completion.tool_calls.is_empty() {
            tracing::info!(run_id = %config.run_id, "Model answered with plain text");
            return Ok(StateUpdate::result(completion.content));
        }

        let calls = completion
            .tool_calls
            .into_iter()
            .map(parse_tool_call)
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            run_id = %config.run_id,
            tool = %calls[0].name,
            count = calls.len(),
            "Model requested tool calls"
        );
        Ok(StateUpdate::tool_calls(calls))
    }
}

/// Normalize a provider function call into `{name, arguments}`
pub fn parse_tool_call(raw: RawToolCall) -> Result<ToolCall> {
    let arguments = if raw.arguments.trim().is_empty() {
        Map::new()
    } else {
        match serde_json::from_str::<Value>(&raw.arguments) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(AgentError::Parse(format!(
                    "arguments for '{}' must be a JSON object, got {other}",
                    raw.name
                )));
            }
            Err(e) => {
                return Err(AgentError::Parse(format!(
                    "arguments for '{}' are not valid JSON: {e}",
                    raw.name
                )));
            }
        }
    };

    Ok(ToolCall {
        name: raw.name,
        arguments,
        id: raw.id,
    })
}

/// Tool execution step
pub struct ToolExecution {
    tools: Arc<ToolRegistry>,
}

impl ToolExecution {
    pub const fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    /// Run the first requested tool call. Later calls are dropped.
    pub async fn run(&self, state: &DecisionState, config: &RunConfig) -> Result<StateUpdate> {
        let call = state
            .first_tool_call()
            .ok_or_else(|| AgentError::InvalidState("No tool calls found in state".into()))?;

        let requested = state.tool_calls.as_ref().map_or(0, Vec::len);
        if requested > 1 {
            tracing::debug!(
                run_id = %config.run_id,
                discarded = requested - 1,
                "Only the first tool call is executed"
            );
        }

        tracing::debug!(run_id = %config.run_id, tool = %call.name, "Executing tool");
        let output = self.tools.execute(call).await?;
        if output.is_message() {
            tracing::warn!(run_id = %config.run_id, tool = %call.name, "Tool reported a failure");
        }

        Ok(StateUpdate::tool_result(output))
    }
}

/// The assembled graph, invocable as one unit
pub struct CompiledGraph {
    model_step: ModelInvocation,
    tool_step: ToolExecution,
    tools: Arc<ToolRegistry>,
}

impl CompiledGraph {
    pub const fn entry_point() -> Node {
        Node::InvokeModel
    }

    pub const fn finish_point() -> Node {
        Node::InvokeTools
    }

    /// Drive a state through the graph and return the terminal state
    #[tracing::instrument(name = "graph", skip_all, fields(run_id = %config.run_id))]
    pub async fn invoke(&self, state: DecisionState, config: &RunConfig) -> Result<DecisionState> {
        let update = self.model_step.run(&state, config).await?;
        let state = state.merge(update);

        match route(&state)? {
            Route::Terminate => Ok(state),
            Route::InvokeTools => {
                let update = self.tool_step.run(&state, config).await?;
                Ok(state.merge(update))
            }
        }
    }

    /// Fresh state from a message list, then [`invoke`](Self::invoke)
    pub async fn invoke_input(
        &self,
        input: Vec<Message>,
        config: &RunConfig,
    ) -> Result<DecisionState> {
        self.invoke(DecisionState::new(input), config).await
    }

    /// Run independent inputs one after another, each under its own run id
    pub async fn batch(
        &self,
        inputs: Vec<Vec<Message>>,
        config: &RunConfig,
    ) -> Vec<(Uuid, Result<DecisionState>)> {
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            let run = config.child();
            let outcome = self.invoke_input(input, &run).await;
            results.push((run.run_id, outcome));
        }
        results
    }

    /// Registry the graph dispatches into
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
}

/// Builder wiring provider, tools and options into a [`CompiledGraph`]
pub struct GraphBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: Arc<ToolRegistry>,
    options: GenerationOptions,
    system_prompt: String,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: Arc::new(ToolRegistry::new()),
            options: GenerationOptions::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Arc::new(tools);
        self
    }

    #[must_use]
    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.options.model = model.into();
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn build(self) -> Result<CompiledGraph> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(CompiledGraph {
            model_step: ModelInvocation::new(
                provider,
                self.tools.clone(),
                self.options,
                self.system_prompt,
            ),
            tool_step: ToolExecution::new(self.tools.clone()),
            tools: self.tools,
        })
    }
}
