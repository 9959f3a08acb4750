use super::args::parse;
use super::traits::{Tool, ToolResult};
use crate::monitor::LogStore;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct ClearLogsArgs {
    confirm: bool,
}

/// Truncate all three monitoring logs, but only with `confirm: true`.
pub struct ClearLogsTool {
    store: Arc<LogStore>,
}

impl ClearLogsTool {
    pub fn new(store: Arc<LogStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ClearLogsTool {
    fn name(&self) -> &str {
        "agentHQ.clearLogs"
    }

    fn title(&self) -> &str {
        "Clear Monitoring Logs"
    }

    fn description(&self) -> &str {
        "Clear all monitoring logs (use with caution)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "confirm": {
                    "type": "boolean",
                    "description": "Must be true to actually clear the logs"
                }
            },
            "required": ["confirm"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let args: ClearLogsArgs = parse(args)?;
        if !args.confirm {
            return Ok(ToolResult::text(
                "Log clearing cancelled. Set confirm=true to proceed.",
            ));
        }

        self.store.clear_all()?;
        info!(dir = %self.store.dir().display(), "Monitoring logs cleared");
        Ok(ToolResult::text("All monitoring logs have been cleared."))
    }
}
