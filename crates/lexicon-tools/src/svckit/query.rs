//! Lexicon Query Tool
//!
//! Searches the loaded lexicon and returns flat summaries of the best
//! matches.

use async_trait::async_trait;
use serde_json::json;

use agent_core::{tool::ParameterSchema, AgentError, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::{error_result, respond, str_arg, SharedSession};
use crate::response::ResponseLimits;
use crate::summary::ResultEntry;

const NAME: &str = "lexicon_query";

/// Tool for natural-language search over the active lexicon
pub struct LexiconQueryTool {
    session: SharedSession,
    limits: ResponseLimits,
}

impl LexiconQueryTool {
    pub fn new(session: SharedSession) -> Self {
        Self {
            session,
            limits: ResponseLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ResponseLimits) -> Self {
        self.limits = limits;
        self
    }
}

#[async_trait]
impl Tool for LexiconQueryTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Search the loaded lexicon for options, e.g. 'heated seats' or 'sunroof'.".into(),
            parameters: vec![
                ParameterSchema::string("query", "What to look for").required(),
                ParameterSchema::string("context", "Optional area to prefer, e.g. 'interior'"),
            ],
            category: Some("lexicon".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = str_arg(call, "query").ok_or_else(|| AgentError::ToolValidation("query is required".into()))?;
        let context = str_arg(call, "context");

        let results = match self.session.read().await.query(query, context) {
            Ok(results) => results,
            Err(err) => return Ok(error_result(NAME, &self.limits, &err)),
        };

        let matches: Vec<_> = results.iter().filter_map(ResultEntry::as_match).collect();
        tracing::debug!(query, context, count = matches.len(), "Lexicon query answered");

        let output = if matches.is_empty() {
            format!("No lexicon entries matched '{query}'.")
        } else {
            let mut output = format!("Found {} match(es) for '{query}':\n", matches.len());
            for m in &matches {
                output.push_str(&format!(
                    "- {} [{}] {} ({:.0}% {})\n",
                    m.option_name,
                    m.category,
                    m.availability,
                    m.confidence * 100.0,
                    m.match_type
                ));
            }
            output
        };

        let data = json!({
            "status": "success",
            "query": query,
            "context": context,
            "count": matches.len(),
            "results": results,
        });
        Ok(respond(NAME, &self.limits, output, data))
    }
}
