use super::args::parse;
use super::traits::{Tool, ToolResult};
use crate::monitor::{compute_status, LogCategory, LogStore};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct GetStatusArgs {}

/// Report health, workflow counts and per-agent metrics. Every call is
/// itself recorded in the status log.
pub struct GetStatusTool {
    store: Arc<LogStore>,
}

impl GetStatusTool {
    pub fn new(store: Arc<LogStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetStatusTool {
    fn name(&self) -> &str {
        "agentHQ.getStatus"
    }

    fn title(&self) -> &str {
        "Get Agent HQ Status"
    }

    fn description(&self) -> &str {
        "Retrieve current status of Agent HQ, including active workflows and agent health."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let GetStatusArgs {} = parse(args)?;

        let status = compute_status(&self.store)?;
        self.store.append(LogCategory::Status, &status.audit_record()?)?;

        let summary = format!(
            "Agent HQ Status:\nHealth: {}\nActive Workflows: {}\nTotal Workflows: {}\nAgents Monitored: {}",
            status.health,
            status.workflows.in_progress,
            status.workflows.total,
            status.agents.len()
        );
        Ok(ToolResult::with_structured(summary, serde_json::to_value(&status)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{
        ActivityRecord, ActivityStatus, ReadOutcome, WorkflowRecord, WorkflowStatus,
    };
    use serde_json::Value;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Arc<LogStore>, GetStatusTool) {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(LogStore::new(tmp.path()));
        let tool = GetStatusTool::new(store.clone());
        (tmp, store, tool)
    }

    #[tokio::test]
    async fn idle_when_nothing_logged() {
        let (_tmp, _store, tool) = setup();
        let result = tool.execute(json!({})).await.unwrap();
        assert_eq!(
            result.summary(),
            "Agent HQ Status:\nHealth: idle\nActive Workflows: 0\nTotal Workflows: 0\nAgents Monitored: 0"
        );
        let structured = result.structured.unwrap();
        assert_eq!(structured["health"], "idle");
        assert!(structured.get("type").is_none());
    }

    #[tokio::test]
    async fn active_with_running_workflow() {
        let (_tmp, store, tool) = setup();
        store
            .append(
                LogCategory::Workflows,
                &WorkflowRecord::new("w1", "build", WorkflowStatus::Started, &[], None, None),
            )
            .unwrap();
        store
            .append(
                LogCategory::Invocations,
                &ActivityRecord::new("coder", "edit", ActivityStatus::Completed, Some(2.0), None),
            )
            .unwrap();

        let result = tool.execute(Value::Null).await.unwrap();
        let structured = result.structured.clone().unwrap();
        assert_eq!(structured["health"], "active");
        assert_eq!(structured["workflows"]["inProgress"], 1);
        assert_eq!(structured["agents"]["coder"]["successRate"], "100.0%");
        assert!(result.summary().contains("Agents Monitored: 1"));
    }

    #[tokio::test]
    async fn each_call_appends_audit_record() {
        let (_tmp, store, tool) = setup();
        tool.execute(json!({})).await.unwrap();
        tool.execute(json!({})).await.unwrap();

        let audit: ReadOutcome<Value> = store.read_all(LogCategory::Status, None).unwrap();
        assert_eq!(audit.records.len(), 2);
        assert_eq!(audit.records[0]["type"], "status_check");
        assert!(audit.records[1]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn non_object_args_rejected() {
        let (_tmp, store, tool) = setup();
        assert!(tool.execute(json!("now")).await.is_err());
        assert!(!store.path(LogCategory::Status).exists());
    }
}
