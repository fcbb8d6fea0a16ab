//! # genui-core
//!
//! Decision graph that routes a chat message either to a plain-text answer
//! or to exactly one tool lookup.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                       CompiledGraph                           │
//! │  ┌──────────────┐   route()   ┌──────────────┐                │
//! │  │ invoke_model │────────────▶│ invoke_tools │                │
//! │  └──────┬───────┘             └──────┬───────┘                │
//! │         │ LlmProvider                │ ToolRegistry           │
//! │         ▼ (Strategy)                 ▼ (name → adapter)       │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each step returns a [`StateUpdate`] which is merged into a fresh
//! [`DecisionState`]; nothing is mutated in place.

pub mod error;
pub mod graph;
pub mod message;
pub mod provider;
pub mod state;
pub mod tool;

pub use error::{AgentError, Result};
pub use graph::{CompiledGraph, GraphBuilder, Node, Route, RunConfig, route};
pub use message::{ChatInput, Message, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider, RawToolCall};
pub use state::{DecisionState, StateUpdate};
pub use tool::{ParameterSchema, Tool, ToolCall, ToolOutput, ToolRegistry, ToolSchema};
