use super::args::parse;
use super::traits::{Tool, ToolResult};
use crate::monitor::{compute_agent_metrics, LogStore};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct GetMetricsArgs {
    agent: Option<String>,
}

/// Per-agent invocation metrics, for every agent or a single one.
pub struct GetMetricsTool {
    store: Arc<LogStore>,
}

impl GetMetricsTool {
    pub fn new(store: Arc<LogStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetMetricsTool {
    fn name(&self) -> &str {
        "agentHQ.getMetrics"
    }

    fn title(&self) -> &str {
        "Get Agent Metrics"
    }

    fn description(&self) -> &str {
        "Retrieve performance metrics for all agents."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "agent": {
                    "type": "string",
                    "description": "Only report this agent"
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let args: GetMetricsArgs = parse(args)?;
        let all = compute_agent_metrics(&self.store)?;

        match args.agent {
            Some(agent) => {
                // an agent with no records gets an empty object, not an error
                let entry = match all.get(&agent) {
                    Some(metrics) => serde_json::to_value(metrics)?,
                    None => Value::Object(Map::new()),
                };
                let summary = format!(
                    "Metrics for {agent}:\n{}",
                    serde_json::to_string_pretty(&entry)?
                );
                let mut metrics = Map::new();
                metrics.insert(agent, entry);
                Ok(ToolResult::with_structured(summary, Value::Object(metrics)))
            }
            None => {
                let summary = format!("Metrics for {} agents", all.len());
                Ok(ToolResult::with_structured(summary, serde_json::to_value(&all)?))
            }
        }
    }
}
