//! Lexicon Fetch Tool
//!
//! Loads a lexicon into the session. Responds with metadata only.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use agent_core::{tool::ParameterSchema, AgentError, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::{error_result, respond, str_arg, SharedSession};
use crate::response::ResponseLimits;
use crate::source::{DocumentSource, FetchRequest};

const NAME: &str = "lexicon_fetch";

/// Tool that fetches a lexicon and makes it the active document
pub struct LexiconFetchTool {
    session: SharedSession,
    source: Arc<dyn DocumentSource>,
    limits: ResponseLimits,
}

impl LexiconFetchTool {
    pub fn new(session: SharedSession, source: Arc<dyn DocumentSource>) -> Self {
        Self {
            session,
            source,
            limits: ResponseLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ResponseLimits) -> Self {
        self.limits = limits;
        self
    }
}

#[async_trait]
impl Tool for LexiconFetchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Fetch the option lexicon for a vehicle model and market, replacing the loaded one.".into(),
            parameters: vec![
                ParameterSchema::string("model", "Vehicle model identifier").required(),
                ParameterSchema::string("country", "Market country code, e.g. 'DE'").required(),
                ParameterSchema::string("date", "Lexicon date (YYYY-MM-DD) or 'latest'").with_default(json!("latest")),
            ],
            category: Some("lexicon".into()),
            has_side_effects: true,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let model = str_arg(call, "model").ok_or_else(|| AgentError::ToolValidation("model is required".into()))?;
        let country =
            str_arg(call, "country").ok_or_else(|| AgentError::ToolValidation("country is required".into()))?;
        let mut request = FetchRequest::new(model, country);
        if let Some(date) = str_arg(call, "date") {
            request = request.with_date(date);
        }

        let document = match self.source.fetch(&request).await {
            Ok(document) => document,
            Err(err) => return Ok(error_result(NAME, &self.limits, &err)),
        };

        let stats = DocumentStats::of(&document);
        let mut session = self.session.write().await;
        let meta = session.load(&request, document);

        tracing::info!(
            model = %meta.model,
            country = %meta.country,
            date = %meta.date,
            version = meta.version,
            nodes = stats.node_count,
            source = self.source.name(),
            "Loaded lexicon"
        );

        let output = format!(
            "Loaded lexicon for {} ({}, {}): {} nodes across {} categories ({}).",
            meta.model,
            meta.country,
            meta.date,
            stats.node_count,
            stats.categories.len(),
            stats.categories.join(", ")
        );
        let data = json!({
            "status": "success",
            "model": meta.model,
            "country": meta.country,
            "date": meta.date,
            "version": meta.version,
            "node_count": stats.node_count,
            "categories": stats.categories,
            "size_bytes": stats.size_bytes,
        });
        Ok(respond(NAME, &self.limits, output, data))
    }
}

/// Shape of a document, reported instead of its content
#[derive(Debug, PartialEq, Eq)]
struct DocumentStats {
    node_count: usize,
    categories: Vec<String>,
    size_bytes: usize,
}

impl DocumentStats {
    fn of(document: &Value) -> Self {
        let categories = document
            .as_object()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();
        Self {
            node_count: count_nodes(document),
            categories,
            size_bytes: serde_json::to_vec(document).map_or(0, |bytes| bytes.len()),
        }
    }
}

/// Number of keys and elements below `value`
fn count_nodes(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.values().map(|child| 1 + count_nodes(child)).sum(),
        Value::Array(items) => items.iter().map(|child| 1 + count_nodes(child)).sum(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LexiconConfig;
    use crate::source::MockDocumentSource;
    use crate::svckit::shared_session;

    fn tool(source: MockDocumentSource) -> (SharedSession, LexiconFetchTool) {
        let session = shared_session(LexiconConfig::default());
        let tool = LexiconFetchTool::new(Arc::clone(&session), Arc::new(source));
        (session, tool)
    }

    #[test]
    fn test_document_stats() {
        let stats = DocumentStats::of(&json!({
            "interior": {"seats": {"price": 1}},
            "packages": [{"name": "Winter"}, {"name": "Sport"}]
        }));
        // interior, seats, price, packages, [0], name, [1], name
        assert_eq!(stats.node_count, 8);
        assert_eq!(stats.categories, vec!["interior", "packages"]);
        assert!(stats.size_bytes > 0);
    }

    #[tokio::test]
    async fn test_fetch_reports_metadata_only() {
        let (session, tool) = tool(MockDocumentSource::new());
        let call = ToolCall::new(NAME).arg("model", "touring").arg("country", "DE");
        let result = tool.execute(&call).await.unwrap();

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["status"], "success");
        assert_eq!(data["date"], "latest");
        assert!(data["categories"].as_array().unwrap().contains(&json!("interior")));
        assert!(data.get("document").is_none());
        assert!(session.read().await.is_loaded());
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_previous_document() {
        let (session, tool) = tool(MockDocumentSource::new());
        tool.execute(&ToolCall::new(NAME).arg("model", "city").arg("country", "DE"))
            .await
            .unwrap();

        let result = tool
            .execute(&ToolCall::new(NAME).arg("model", "hovercraft").arg("country", "DE"))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.data.unwrap()["code"], "FETCH_FAILURE");
        assert_eq!(session.read().await.meta().unwrap().model, "city");
    }

    #[tokio::test]
    async fn test_missing_model_is_rejected() {
        let (_, tool) = tool(MockDocumentSource::new());
        let err = tool
            .execute(&ToolCall::new(NAME).arg("country", "DE"))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ToolValidation(_)));
    }
}
