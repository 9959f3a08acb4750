use super::args::{check_duration, parse, require_non_empty};
use super::traits::{Tool, ToolResult};
use crate::monitor::{ActivityRecord, ActivityStatus, Context, LogCategory, LogStore};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct LogActivityArgs {
    agent: String,
    action: String,
    status: ActivityStatus,
    duration: Option<f64>,
    context: Option<Context>,
}

/// Append one agent invocation to the invocations log.
pub struct LogActivityTool {
    store: Arc<LogStore>,
}

impl LogActivityTool {
    pub fn new(store: Arc<LogStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for LogActivityTool {
    fn name(&self) -> &str {
        "agentHQ.logActivity"
    }

    fn title(&self) -> &str {
        "Log Agent Activity"
    }

    fn description(&self) -> &str {
        "Log an agent invocation or activity for monitoring purposes."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "agent": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Agent name (stored up to 100 characters)"
                },
                "action": {
                    "type": "string",
                    "minLength": 1,
                    "description": "What the agent did (stored up to 200 characters)"
                },
                "status": {
                    "type": "string",
                    "enum": ["started", "completed", "failed"]
                },
                "duration": {
                    "type": "number",
                    "minimum": 0,
                    "description": "Duration in seconds"
                },
                "context": {
                    "type": "object",
                    "additionalProperties": true,
                    "description": "Extra metadata (serialized form kept within 1000 characters)"
                }
            },
            "required": ["agent", "action", "status"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let args: LogActivityArgs = parse(args)?;
        require_non_empty("agent", &args.agent, "Agent name is required")?;
        require_non_empty("action", &args.action, "Action is required")?;
        check_duration("duration", args.duration)?;

        let record = ActivityRecord::new(
            &args.agent,
            &args.action,
            args.status,
            args.duration,
            args.context,
        );
        self.store.append(LogCategory::Invocations, &record)?;

        Ok(ToolResult::text(format!(
            "Logged activity for {}: {} ({})",
            args.agent, args.action, args.status
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::ReadOutcome;
    use crate::tools::args::ToolArgError;
    use tempfile::TempDir;

    fn tool() -> (TempDir, Arc<LogStore>, LogActivityTool) {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(LogStore::new(tmp.path().join("logs")));
        let tool = LogActivityTool::new(store.clone());
        (tmp, store, tool)
    }

    fn stored(store: &LogStore) -> Vec<ActivityRecord> {
        let read: ReadOutcome<ActivityRecord> =
            store.read_all(LogCategory::Invocations, None).unwrap();
        read.records
    }

    #[test]
    fn spec_names_required_fields() {
        let (_tmp, _store, tool) = tool();
        let spec = tool.spec();
        assert_eq!(spec.name, "agentHQ.logActivity");
        assert_eq!(spec.title, "Log Agent Activity");
        assert_eq!(
            spec.parameters["required"],
            json!(["agent", "action", "status"])
        );
    }

    #[tokio::test]
    async fn logs_activity() {
        let (_tmp, store, tool) = tool();
        let result = tool
            .execute(json!({
                "agent": "planner",
                "action": "draft plan",
                "status": "completed",
                "duration": 4.5,
                "context": {"ticket": "ABC-1"}
            }))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(
            result.summary(),
            "Logged activity for planner: draft plan (completed)"
        );

        let records = stored(&store);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].agent, "planner");
        assert_eq!(records[0].duration, Some(4.5));
        assert_eq!(records[0].context.as_ref().unwrap()["ticket"], "ABC-1");
        assert!(!records[0].timestamp.is_empty());
    }

    #[tokio::test]
    async fn long_agent_name_stored_truncated() {
        let (_tmp, store, tool) = tool();
        let agent = "q".repeat(150);
        tool.execute(json!({"agent": agent, "action": "x", "status": "started"}))
            .await
            .unwrap();
        assert_eq!(stored(&store)[0].agent, "q".repeat(100));
    }

    #[tokio::test]
    async fn empty_agent_rejected_before_write() {
        let (_tmp, store, tool) = tool();
        let err = tool
            .execute(json!({"agent": "", "action": "x", "status": "started"}))
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<ToolArgError>().is_some());
        assert!(err.to_string().contains("Agent name is required"));
        assert!(!store.path(LogCategory::Invocations).exists());
    }

    #[tokio::test]
    async fn invalid_status_rejected() {
        let (_tmp, store, tool) = tool();
        let err = tool
            .execute(json!({"agent": "a", "action": "x", "status": "in-progress"}))
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<ToolArgError>().is_some());
        assert!(!store.dir().exists());
    }

    #[tokio::test]
    async fn negative_duration_rejected() {
        let (_tmp, _store, tool) = tool();
        let err = tool
            .execute(json!({"agent": "a", "action": "x", "status": "failed", "duration": -3}))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ToolArgError>(),
            Some(ToolArgError::NotNonNegative { .. })
        ));
    }

    #[tokio::test]
    async fn missing_action_rejected() {
        let (_tmp, _store, tool) = tool();
        let err = tool
            .execute(json!({"agent": "a", "status": "failed"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("action"), "{err}");
    }
}
