//! Service Kit - Agent Tools
//!
//! The three lexicon tools implement `agent_core::Tool` over one shared
//! [`LexiconSession`]. Every structured payload is bounded before it leaves.

mod fetch;
mod modify;
mod query;

pub use fetch::LexiconFetchTool;
pub use modify::LexiconModifyTool;
pub use query::LexiconQueryTool;

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::RwLock;

use agent_core::{ToolCall, ToolRegistry, ToolResult};

use crate::change_order::{ChangeOrderGenerator, HttpChangeOrderGenerator, MockChangeOrderGenerator};
use crate::config::LexiconConfig;
use crate::error::{LexiconError, Result};
use crate::response::ResponseLimits;
use crate::session::LexiconSession;
use crate::source::{DocumentSource, HttpDocumentSource, MockDocumentSource, SourceConfig};

/// Session state shared by the tools of one agent
pub type SharedSession = Arc<RwLock<LexiconSession>>;

pub fn shared_session(config: LexiconConfig) -> SharedSession {
    Arc::new(RwLock::new(LexiconSession::new(config)))
}

/// External collaborators used by the tools
#[derive(Clone)]
pub struct Collaborators {
    pub source: Arc<dyn DocumentSource>,
    pub change_orders: Arc<dyn ChangeOrderGenerator>,
}

impl Collaborators {
    /// HTTP clients where a URL is configured, mocks otherwise
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let source: Arc<dyn DocumentSource> = match &config.lexicon_url {
            Some(url) => Arc::new(HttpDocumentSource::new(url.as_str(), config.timeout)?),
            None => Arc::new(MockDocumentSource::new()),
        };
        let change_orders: Arc<dyn ChangeOrderGenerator> = match &config.change_order_url {
            Some(url) => Arc::new(HttpChangeOrderGenerator::new(url.as_str(), config.timeout)?),
            None => Arc::new(MockChangeOrderGenerator),
        };

        tracing::info!(
            source = source.name(),
            change_orders = change_orders.name(),
            "Lexicon collaborators ready"
        );
        Ok(Self { source, change_orders })
    }

    pub fn mock() -> Self {
        Self {
            source: Arc::new(MockDocumentSource::new()),
            change_orders: Arc::new(MockChangeOrderGenerator),
        }
    }
}

/// Register fetch, query and modify over one session
pub fn register_tools(registry: &mut ToolRegistry, session: &SharedSession, collaborators: &Collaborators) {
    let limits = ResponseLimits::default();
    registry.register(LexiconFetchTool::new(Arc::clone(session), Arc::clone(&collaborators.source)).with_limits(limits));
    registry.register(LexiconQueryTool::new(Arc::clone(session)).with_limits(limits));
    registry.register(
        LexiconModifyTool::new(Arc::clone(session), Arc::clone(&collaborators.change_orders)).with_limits(limits),
    );
}

/// Trimmed, non-empty string argument
fn str_arg<'a>(call: &'a ToolCall, name: &str) -> Option<&'a str> {
    call.arguments
        .get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn respond(tool: &str, limits: &ResponseLimits, output: String, data: Value) -> ToolResult {
    ToolResult::success(tool, output).with_data(limits.bound(data))
}

/// Structured error response; failures never escape a tool as `Err`
fn error_result(tool: &str, limits: &ResponseLimits, err: &LexiconError) -> ToolResult {
    if err.is_recoverable() {
        tracing::warn!(tool, code = err.code(), %err, "Tool request rejected");
    } else {
        tracing::error!(tool, code = err.code(), %err, "Tool request failed");
    }

    let message = err.user_message();
    let mut data = json!({
        "status": "error",
        "code": err.code(),
        "message": message,
        "suggestion": suggestion(err),
    });
    if let LexiconError::UnknownConfirmationId { valid, .. } = err {
        data["valid_ids"] = json!(valid);
    }
    ToolResult::failure(tool, message).with_data(limits.bound(data))
}

fn suggestion(err: &LexiconError) -> &'static str {
    match err {
        LexiconError::NoDocumentLoaded => "Call lexicon_fetch with a model and country.",
        LexiconError::Fetch(_) | LexiconError::Network(_) => "Verify the model, country and date, then fetch again.",
        LexiconError::ModificationParse(_) => "Say what the new value is, or pass new_value.",
        LexiconError::UnknownConfirmationId { .. } => "Use one of the pending plan ids, or plan the change again.",
        LexiconError::InvalidPath { .. } => "Use a path returned by lexicon_query, e.g. interior.leather_seats.",
        LexiconError::Apply(_) => "Query the lexicon again and plan a fresh change.",
        _ => "Try rephrasing the request.",
    }
}
