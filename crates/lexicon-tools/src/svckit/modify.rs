//! Lexicon Modify Tool
//!
//! Two-phase modification: a request is resolved to a single target and
//! planned, then applied only when the caller echoes the plan id back as
//! `confirmation_id`.
//!
//! ```text
//! request ──► resolve ──┬─► no_targets_found
//!                       ├─► disambiguation_required (re-issue with target_path)
//!                       └─► confirmation_required ──► confirm ──► success
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use agent_core::{tool::ParameterSchema, AgentError, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::{error_result, respond, str_arg, SharedSession};
use crate::change_order::ChangeOrderGenerator;
use crate::error::LexiconError;
use crate::planner::{ModificationRequest, PendingChange, PlanOutcome, TargetOption};
use crate::response::ResponseLimits;
use crate::session::ConfirmedChange;

const NAME: &str = "lexicon_modify";

/// Tool that plans and applies single changes to the active lexicon
pub struct LexiconModifyTool {
    session: SharedSession,
    change_orders: Arc<dyn ChangeOrderGenerator>,
    limits: ResponseLimits,
}

impl LexiconModifyTool {
    pub fn new(session: SharedSession, change_orders: Arc<dyn ChangeOrderGenerator>) -> Self {
        Self {
            session,
            change_orders,
            limits: ResponseLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ResponseLimits) -> Self {
        self.limits = limits;
        self
    }
}

#[async_trait]
impl Tool for LexiconModifyTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Plan a change to the loaded lexicon ('remove leather seats', 'change sunroof price to 1350'), \
                          then apply it by passing the returned plan id as confirmation_id."
                .into(),
            parameters: vec![
                ParameterSchema::string("request", "The change in plain words"),
                ParameterSchema::string("target_path", "Exact path to change, e.g. from a disambiguation option"),
                ParameterSchema::new("new_value", "any", "Value to set; overrides the one in the request"),
                ParameterSchema::string("confirmation_id", "Plan id to apply"),
            ],
            category: Some("lexicon".into()),
            has_side_effects: true,
        }
    }

    fn validate(&self, call: &ToolCall) -> CoreResult<()> {
        if str_arg(call, "request").is_none() && str_arg(call, "confirmation_id").is_none() {
            return Err(AgentError::ToolValidation(
                "either request or confirmation_id is required".into(),
            ));
        }
        Ok(())
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        self.validate(call)?;

        if let Some(plan_id) = str_arg(call, "confirmation_id") {
            return Ok(self.confirm(plan_id).await);
        }

        let request = ModificationRequest {
            request: str_arg(call, "request").unwrap_or_default().to_string(),
            target_path: str_arg(call, "target_path").map(str::to_string),
            new_value: call.arguments.get("new_value").filter(|v| !v.is_null()).cloned(),
        };
        Ok(self.plan(&request).await)
    }
}

impl LexiconModifyTool {
    async fn plan(&self, request: &ModificationRequest) -> ToolResult {
        let outcome = self.session.write().await.plan_modification(request);

        match outcome {
            Ok(PlanOutcome::Planned(change)) => self.confirmation_required(&change),
            Ok(PlanOutcome::Ambiguous { options }) => self.disambiguation_required(request, &options),
            Ok(PlanOutcome::NotFound { suggestions }) => {
                tracing::warn!(request = %request.request, suggestions = suggestions.len(), "No modification target found");
                let message = LexiconError::NoTargetsFound {
                    request: request.request.clone(),
                    suggestions: suggestions.clone(),
                }
                .user_message();
                let data = json!({
                    "status": "no_targets_found",
                    "request": request.request,
                    "message": message,
                    "suggestions": suggestions,
                });
                respond(NAME, &self.limits, message, data)
            }
            Err(err) => error_result(NAME, &self.limits, &err),
        }
    }

    fn confirmation_required(&self, change: &PendingChange) -> ToolResult {
        let output = format!(
            "{} Confirm by calling {NAME} with confirmation_id=\"{}\".",
            change.impact, change.plan_id
        );
        let data = json!({
            "status": "confirmation_required",
            "plan_id": change.plan_id,
            "modification_type": change.modification_type,
            "target_path": change.target_path,
            "option_name": change.option_name,
            "category": change.category,
            "previous_value": change.previous_value,
            "new_value": change.new_value,
            "impact": change.impact,
            "requires_confirmation": change.requires_confirmation,
            "message": output,
        });
        respond(NAME, &self.limits, output, data)
    }

    fn disambiguation_required(&self, request: &ModificationRequest, options: &[TargetOption]) -> ToolResult {
        let message = LexiconError::AmbiguousTargets(options.len()).user_message();
        tracing::info!(request = %request.request, options = options.len(), "Modification target is ambiguous");

        let mut output = format!("{message}\n");
        for option in options {
            output.push_str(&format!(
                "{}. {} [{}] path={} current={}\n",
                option.option_id, option.option_name, option.category, option.path, option.current_value
            ));
        }

        let data = json!({
            "status": "disambiguation_required",
            "request": request.request,
            "message": message,
            "options": options,
        });
        respond(NAME, &self.limits, output, data)
    }

    async fn confirm(&self, plan_id: &str) -> ToolResult {
        let confirmed = self.session.write().await.confirm(plan_id);
        let ConfirmedChange {
            applied,
            original,
            modified,
        } = match confirmed {
            Ok(confirmed) => confirmed,
            Err(err) => return error_result(NAME, &self.limits, &err),
        };

        let change_order = match self.change_orders.generate(&original, &modified).await {
            Ok(order) => order,
            Err(err) => {
                tracing::warn!(plan_id, %err, generator = self.change_orders.name(), "Change order generation failed");
                json!({"error": err.user_message()})
            }
        };

        let change = &applied.change;
        let output = format!("Applied {}: {}", change.plan_id, change.impact);
        let data = json!({
            "status": "success",
            "plan_id": change.plan_id,
            "modification_type": change.modification_type,
            "target_path": change.target_path,
            "previous_value": change.previous_value,
            "new_value": change.new_value,
            "applied_at": applied.applied_at,
            "document_version": applied.document_version,
            "change_order": change_order,
        });
        respond(NAME, &self.limits, output, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change_order::MockChangeOrderGenerator;
    use crate::error::Result;
    use crate::svckit::test_support::{leather_document, loaded_session};

    fn plan_id_of(data: &Value) -> &str {
        data["plan_id"].as_str().unwrap_or_default()
    }

    struct FailingGenerator;

    #[async_trait]
    impl ChangeOrderGenerator for FailingGenerator {
        async fn generate(&self, _original: &Value, _modified: &Value) -> Result<Value> {
            Err(LexiconError::ChangeOrder("service down".into()))
        }

        fn name(&self) -> &str {
            "Failing"
        }
    }

    async fn tool(document: Value) -> (SharedSession, LexiconModifyTool) {
        let session = loaded_session(document).await;
        let tool = LexiconModifyTool::new(Arc::clone(&session), Arc::new(MockChangeOrderGenerator));
        (session, tool)
    }

    fn request(text: &str) -> ToolCall {
        ToolCall::new(NAME).arg("request", text)
    }

    #[tokio::test]
    async fn test_remove_then_confirm() {
        let (session, tool) = tool(leather_document()).await;

        let planned = tool.execute(&request("remove leather seats")).await.unwrap();
        let data = planned.data.unwrap();
        assert_eq!(data["status"], "confirmation_required");
        assert_eq!(data["modification_type"], "remove");
        assert_eq!(data["target_path"], "interior.leather_seats");

        let plan_id = plan_id_of(&data).to_string();
        assert!(plan_id.starts_with("mod_"));
        assert_eq!(session.read().await.pending_ids(), vec![plan_id.clone()]);

        let applied = tool
            .execute(&ToolCall::new(NAME).arg("confirmation_id", plan_id.as_str()))
            .await
            .unwrap();
        let data = applied.data.unwrap();
        assert_eq!(data["status"], "success");
        assert_eq!(data["change_order"]["change_count"], 1);

        let session = session.read().await;
        assert!(session.document().unwrap()["interior"].get("leather_seats").is_none());
        assert!(session.pending_ids().is_empty());
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].change.plan_id, plan_id);
    }

    #[tokio::test]
    async fn test_ambiguous_request_then_explicit_path() {
        let mut document = leather_document();
        document["interior"]["cloth_seats"] = json!({"price": 0});
        let (session, tool) = tool(document).await;

        let result = tool.execute(&request("remove seats")).await.unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["status"], "disambiguation_required");
        assert_eq!(data["options"].as_array().unwrap().len(), 2);
        assert!(session.read().await.pending_ids().is_empty());

        let path = data["options"][1]["path"].as_str().unwrap();
        let result = tool
            .execute(&request("remove seats").arg("target_path", path))
            .await
            .unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["status"], "confirmation_required");
        assert_eq!(data["target_path"], "interior.cloth_seats");
    }

    #[tokio::test]
    async fn test_no_targets_found() {
        let (_, tool) = tool(leather_document()).await;
        let result = tool.execute(&request("remove leathr")).await.unwrap();

        let data = result.data.unwrap();
        assert_eq!(data["status"], "no_targets_found");
        assert!(data["suggestions"].as_array().unwrap().contains(&json!("leather")));
    }

    #[tokio::test]
    async fn test_update_with_new_value_override() {
        let (session, tool) = tool(leather_document()).await;
        let call = ToolCall::new(NAME)
            .arg("request", "update price")
            .arg("target_path", "interior.leather_seats.price")
            .arg("new_value", 1750);
        let data = tool.execute(&call).await.unwrap().data.unwrap();
        assert_eq!(data["status"], "confirmation_required");
        assert_eq!(data["new_value"], 1750);

        tool.execute(&ToolCall::new(NAME).arg("confirmation_id", plan_id_of(&data)))
            .await
            .unwrap();
        assert_eq!(
            session.read().await.document().unwrap()["interior"]["leather_seats"]["price"],
            1750
        );
    }

    #[tokio::test]
    async fn test_update_without_value_is_an_error_response() {
        let (_, tool) = tool(leather_document()).await;
        let result = tool.execute(&request("update leather seats")).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.data.unwrap()["code"], "MODIFICATION_PARSE_FAILURE");
    }

    #[tokio::test]
    async fn test_unknown_confirmation_id() {
        let (session, tool) = tool(leather_document()).await;
        let planned = tool.execute(&request("remove leather seats")).await.unwrap().data.unwrap();
        let before = session.read().await.document().unwrap();

        let result = tool
            .execute(&ToolCall::new(NAME).arg("confirmation_id", "mod_nope"))
            .await
            .unwrap();
        assert!(!result.success);
        let data = result.data.unwrap();
        assert_eq!(data["code"], "UNKNOWN_CONFIRMATION_ID");
        assert!(data["message"].as_str().unwrap().contains(plan_id_of(&planned)));
        assert_eq!(data["valid_ids"], json!([plan_id_of(&planned)]));
        assert_eq!(session.read().await.document().unwrap(), before);
    }

    #[tokio::test]
    async fn test_change_order_failure_keeps_the_change() {
        let session = loaded_session(leather_document()).await;
        let tool = LexiconModifyTool::new(Arc::clone(&session), Arc::new(FailingGenerator));

        let planned = tool.execute(&request("remove leather seats")).await.unwrap().data.unwrap();
        let result = tool
            .execute(&ToolCall::new(NAME).arg("confirmation_id", plan_id_of(&planned)))
            .await
            .unwrap();

        let data = result.data.unwrap();
        assert_eq!(data["status"], "success");
        assert!(data["change_order"]["error"].is_string());
        assert!(session.read().await.document().unwrap()["interior"].get("leather_seats").is_none());
    }

    #[tokio::test]
    async fn test_request_or_confirmation_required() {
        let (_, tool) = tool(leather_document()).await;
        let err = tool.execute(&ToolCall::new(NAME)).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolValidation(_)));
    }
}
