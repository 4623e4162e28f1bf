//! Application State

use std::sync::Arc;

use agent_core::ToolRegistry;
use lexicon_tools::{register_tools, shared_session, Collaborators, LexiconConfig, SharedSession};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Registry holding the lexicon tools
    pub tools: Arc<ToolRegistry>,

    /// Session the tools operate on
    pub session: SharedSession,

    /// Names of the active document source and change-order generator
    pub source_name: String,
    pub change_order_name: String,
}

impl AppState {
    pub fn new(config: LexiconConfig, collaborators: &Collaborators) -> Self {
        let session = shared_session(config);
        let mut tools = ToolRegistry::new();
        register_tools(&mut tools, &session, collaborators);

        Self {
            tools: Arc::new(tools),
            session,
            source_name: collaborators.source.name().to_string(),
            change_order_name: collaborators.change_orders.name().to_string(),
        }
    }
}
