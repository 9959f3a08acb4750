use super::args::{check_range, parse};
use super::traits::{Tool, ToolResult};
use crate::monitor::{LogCategory, LogStore};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ActivityKind {
    Invocations,
    Workflows,
    #[default]
    All,
}

impl ActivityKind {
    fn includes(self, category: LogCategory) -> bool {
        match self {
            Self::All => true,
            Self::Invocations => category == LogCategory::Invocations,
            Self::Workflows => category == LogCategory::Workflows,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecentActivitiesArgs {
    limit: Option<u64>,
    #[serde(rename = "type", default)]
    kind: ActivityKind,
}

/// The most recent raw records from the invocation and/or workflow logs.
pub struct RecentActivitiesTool {
    store: Arc<LogStore>,
}

impl RecentActivitiesTool {
    pub fn new(store: Arc<LogStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for RecentActivitiesTool {
    fn name(&self) -> &str {
        "agentHQ.getRecentActivities"
    }

    fn title(&self) -> &str {
        "Get Recent Activities"
    }

    fn description(&self) -> &str {
        "Retrieve recent agent invocations and workflow activities."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_LIMIT,
                    "description": "Records per log (default 20)"
                },
                "type": {
                    "type": "string",
                    "enum": ["invocations", "workflows", "all"],
                    "description": "Which log to read (default all)"
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let args: RecentActivitiesArgs = parse(args)?;
        let limit = args.limit.unwrap_or(DEFAULT_LIMIT);
        check_range("limit", limit, 1, MAX_LIMIT)?;
        let limit = usize::try_from(limit)?;

        let mut activities = Map::new();
        for category in [LogCategory::Invocations, LogCategory::Workflows] {
            if args.kind.includes(category) {
                let read = self.store.read_all::<Value>(category, Some(limit))?;
                activities.insert(category.as_str().to_string(), Value::Array(read.records));
            }
        }

        let count = |key: &str| activities.get(key).and_then(Value::as_array).map_or(0, Vec::len);
        let summary = format!(
            "Recent activities (last {limit}):\nInvocations: {}\nWorkflows: {}",
            count("invocations"),
            count("workflows")
        );

        Ok(ToolResult::with_structured(summary, Value::Object(activities)))
    }
}
