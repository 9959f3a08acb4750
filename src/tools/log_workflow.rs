use super::args::{check_duration, parse, require_non_empty};
use super::traits::{Tool, ToolResult};
use crate::monitor::{Context, LogCategory, LogStore, WorkflowRecord, WorkflowStatus};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogWorkflowArgs {
    workflow_id: String,
    workflow_type: String,
    status: WorkflowStatus,
    #[serde(default)]
    agents: Vec<String>,
    duration: Option<f64>,
    context: Option<Context>,
}

/// Append one workflow lifecycle event to the workflows log.
pub struct LogWorkflowTool {
    store: Arc<LogStore>,
}

impl LogWorkflowTool {
    pub fn new(store: Arc<LogStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for LogWorkflowTool {
    fn name(&self) -> &str {
        "agentHQ.logWorkflow"
    }

    fn title(&self) -> &str {
        "Log Workflow Activity"
    }

    fn description(&self) -> &str {
        "Log a workflow execution for monitoring purposes."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "workflowId": { "type": "string", "minLength": 1 },
                "workflowType": { "type": "string", "minLength": 1 },
                "status": {
                    "type": "string",
                    "enum": ["started", "in-progress", "completed", "failed"]
                },
                "agents": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Participating agents (first 20 are kept)"
                },
                "duration": { "type": "number", "minimum": 0 },
                "context": { "type": "object", "additionalProperties": true }
            },
            "required": ["workflowId", "workflowType", "status"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let args: LogWorkflowArgs = parse(args)?;
        require_non_empty("workflowId", &args.workflow_id, "Workflow ID is required")?;
        require_non_empty("workflowType", &args.workflow_type, "Workflow type is required")?;
        check_duration("duration", args.duration)?;

        let record = WorkflowRecord::new(
            &args.workflow_id,
            &args.workflow_type,
            args.status,
            &args.agents,
            args.duration,
            args.context,
        );
        self.store.append(LogCategory::Workflows, &record)?;

        Ok(ToolResult::text(format!(
            "Logged workflow: {} ({}) - {}",
            args.workflow_type, args.workflow_id, record.status
        )))
    }
}
