//! Application State

use std::sync::Arc;

use genui_core::CompiledGraph;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Decision graph, built once at startup and shared read-only
    pub graph: Arc<CompiledGraph>,
}

impl AppState {
    pub fn new(graph: CompiledGraph) -> Self {
        Self {
            graph: Arc::new(graph),
        }
    }
}
