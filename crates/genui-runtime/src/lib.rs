//! # genui-runtime
//!
//! Runtime providers for the genui backend.
//!
//! ## Providers
//!
//! - **OpenAI** (default): chat completions with function calling, against
//!   api.openai.com or any compatible endpoint (`OPENAI_BASE_URL`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use genui_runtime::OpenAiProvider;
//!
//! let provider = OpenAiProvider::from_env()?;
//! let graph = GraphBuilder::new()
//!     .provider(Arc::new(provider))
//!     .tools(registry)
//!     .build()?;
//! ```

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAiConfig, OpenAiProvider};

// Re-export core types for convenience
pub use genui_core::{AgentError, GenerationOptions, LlmProvider, Message, Result, Role};
