use super::args::{check_range, parse, require_non_empty};
use super::traits::{Tool, ToolResult};
use crate::jira::{JiraClient, SearchQuery};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchArgs {
    jql: String,
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    expand: Vec<String>,
    max_results: Option<u32>,
    start_at: Option<u64>,
}

/// JQL search against the configured Jira site.
pub struct JiraSearchTool {
    client: Arc<JiraClient>,
}

impl JiraSearchTool {
    pub fn new(client: Arc<JiraClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for JiraSearchTool {
    fn name(&self) -> &str {
        "jira.search"
    }

    fn title(&self) -> &str {
        "Search Jira issues"
    }

    fn description(&self) -> &str {
        "Run a JQL query against Jira."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "jql": { "type": "string", "minLength": 1, "description": "JQL query" },
                "fields": { "type": "array", "items": { "type": "string" } },
                "expand": { "type": "array", "items": { "type": "string" } },
                "maxResults": { "type": "integer", "minimum": 1, "maximum": 100 },
                "startAt": { "type": "integer", "minimum": 0 }
            },
            "required": ["jql"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let args: SearchArgs = parse(args)?;
        require_non_empty("jql", &args.jql, "JQL query is required")?;
        if let Some(max) = args.max_results {
            check_range("maxResults", u64::from(max), 1, 100)?;
        }

        let query = SearchQuery {
            jql: args.jql,
            fields: args.fields,
            expand: args.expand,
            max_results: args.max_results,
            start_at: args.start_at,
        };
        let data = self.client.search(&query).await?;

        let count = data
            .get("issues")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        let total = data
            .get("total")
            .filter(|t| t.is_number())
            .map_or_else(|| "unknown".to_string(), Value::to_string);
        let summary = format!("Search returned {count} issues (total {total}).");
        Ok(ToolResult::with_structured(summary, data))
    }
}
