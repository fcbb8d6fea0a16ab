//! # genui-tools
//!
//! The three tool adapters the decision graph can dispatch to:
//!
//! ```text
//! ┌────────────────┬──────────────────────────────┬───────────────────┐
//! │ name           │ arguments                    │ credential        │
//! ├────────────────┼──────────────────────────────┼───────────────────┤
//! │ github-repo    │ owner, repo                  │ GITHUB_TOKEN      │
//! │ invoice-parser │ orderId, lineItems, ...      │ -                 │
//! │ weather-data   │ city, state, country="usa"   │ GEOCODE_API_KEY   │
//! └────────────────┴──────────────────────────────┴───────────────────┘
//! ```
//!
//! Lookup failures come back as a `ToolOutput::Message` so the conversation
//! can continue; a missing credential is a fatal `AgentError`.

pub mod credentials;
pub mod error;
pub mod model;
pub mod svckit;

use std::sync::Arc;

use genui_core::ToolRegistry;

pub use credentials::{CredentialSource, EnvCredentials};
pub use error::{Result, ToolError};
pub use model::{Invoice, LineItem, RepoInfo, WeatherReport};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{
        GithubConfig, GithubRepoTool, InvoiceParserTool, WeatherConfig, WeatherDataTool,
    };
}

/// Names of the fixed tool set
pub const TOOL_NAMES: [&str; 3] = [
    svckit::GITHUB_REPO,
    svckit::INVOICE_PARSER,
    svckit::WEATHER_DATA,
];

/// Endpoint settings for the adapters
#[derive(Clone, Debug, Default)]
pub struct ToolsConfig {
    pub github: tools::GithubConfig,
    pub weather: tools::WeatherConfig,
}

/// Registry with the three adapters against their public endpoints
pub fn default_registry(credentials: Arc<dyn CredentialSource>) -> ToolRegistry {
    registry_with(ToolsConfig::default(), credentials)
}

/// Registry with the three adapters against the given endpoints
pub fn registry_with(config: ToolsConfig, credentials: Arc<dyn CredentialSource>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(tools::GithubRepoTool::new(config.github, credentials.clone()));
    registry.register(tools::InvoiceParserTool::new());
    registry.register(tools::WeatherDataTool::new(config.weather, credentials));
    registry
}
