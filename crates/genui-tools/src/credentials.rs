//! Credential Lookup
//!
//! Adapters read their secrets at call time, before any network request.

use std::collections::HashMap;

use genui_core::{AgentError, Result};

/// Read-only source of secrets by name (Strategy pattern)
pub trait CredentialSource: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;

    /// Like [`get`](Self::get) but a missing or empty value is fatal
    fn require(&self, name: &str) -> Result<String> {
        self.get(name)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AgentError::MissingCredential(name.to_string()))
    }
}

/// Process environment
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl CredentialSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}
