//! Decision State
//!
//! The record threaded through the graph. Steps never mutate it: each one
//! returns a [`StateUpdate`] which the graph folds into a new state with
//! [`DecisionState::merge`].

use serde::{Deserialize, Serialize};

use crate::message::{ChatInput, Message};
use crate::tool::{ToolCall, ToolOutput};

/// State threaded through the decision graph
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionState {
    /// Incoming message history, set once at graph entry
    pub input: Vec<Message>,

    /// Plain text answer when the model used no tool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Tool calls requested by the model, in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    /// Output of the executed tool call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<ToolOutput>,
}

/// Partial state produced by a single step
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<ToolOutput>,
}

impl StateUpdate {
    pub fn result(text: impl Into<String>) -> Self {
        Self {
            result: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: Some(calls),
            ..Self::default()
        }
    }

    pub fn tool_result(output: ToolOutput) -> Self {
        Self {
            tool_result: Some(output),
            ..Self::default()
        }
    }
}

impl DecisionState {
    /// Fresh state at graph entry
    pub const fn new(input: Vec<Message>) -> Self {
        Self {
            input,
            result: None,
            tool_calls: None,
            tool_result: None,
        }
    }

    /// Fold a step's output into a new state. Fields present in `update`
    /// overwrite; absent fields are carried over.
    #[must_use]
    pub fn merge(self, update: StateUpdate) -> Self {
        Self {
            input: self.input,
            result: update.result.or(self.result),
            tool_calls: update.tool_calls.or(self.tool_calls),
            tool_result: update.tool_result.or(self.tool_result),
        }
    }

    /// First requested tool call, if any
    pub fn first_tool_call(&self) -> Option<&ToolCall> {
        self.tool_calls.as_deref().and_then(|calls| calls.first())
    }
}

impl From<ChatInput> for DecisionState {
    fn from(input: ChatInput) -> Self {
        Self::new(input.input)
    }
}
