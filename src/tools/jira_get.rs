use super::args::{parse, require_non_empty};
use super::traits::{Tool, ToolResult};
use crate::jira::JiraClient;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetIssueArgs {
    issue_key: String,
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    expand: Vec<String>,
}

pub struct JiraGetTool {
    client: Arc<JiraClient>,
}

impl JiraGetTool {
    pub fn new(client: Arc<JiraClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for JiraGetTool {
    fn name(&self) -> &str {
        "jira.get"
    }

    fn title(&self) -> &str {
        "Get Jira issue"
    }

    fn description(&self) -> &str {
        "Retrieve a Jira issue by key."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "issueKey": { "type": "string", "minLength": 1, "description": "Issue key, e.g. ABC-123" },
                "fields": { "type": "array", "items": { "type": "string" } },
                "expand": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["issueKey"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let args: GetIssueArgs = parse(args)?;
        require_non_empty("issueKey", &args.issue_key, "Issue key is required")?;

        let data = self
            .client
            .get_issue(&args.issue_key, &args.fields, &args.expand)
            .await?;

        let title = data
            .pointer("/fields/summary")
            .and_then(Value::as_str)
            .unwrap_or("No summary");
        let summary = format!("Fetched issue {}: {title}", args.issue_key);
        Ok(ToolResult::with_structured(summary, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JiraConfig, JiraOptions};
    use crate::tools::ToolArgError;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool(base_url: &str) -> JiraGetTool {
        let config = JiraConfig {
            base_url: base_url.to_string(),
            email: "user@example.com".into(),
            api_token: "secret".into(),
            options: JiraOptions::default(),
        };
        JiraGetTool::new(Arc::new(JiraClient::new(config).unwrap()))
    }

    #[tokio::test]
    async fn summary_uses_key_and_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/ABC-1"))
            .and(query_param("fields", "summary,status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "key": "ABC-1",
                "fields": {"summary": "Login button broken", "status": {"name": "Open"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = tool(&server.uri())
            .execute(json!({"issueKey": "ABC-1", "fields": ["summary", "status"]}))
            .await
            .unwrap();
        assert_eq!(result.summary(), "Fetched issue ABC-1: Login button broken");
        assert_eq!(
            result.structured.unwrap()["fields"]["status"]["name"],
            "Open"
        );
    }

    #[tokio::test]
    async fn missing_summary_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/ABC-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"key": "ABC-2", "fields": {}})))
            .mount(&server)
            .await;

        let result = tool(&server.uri())
            .execute(json!({"issueKey": "ABC-2"}))
            .await
            .unwrap();
        assert_eq!(result.summary(), "Fetched issue ABC-2: No summary");
    }

    #[tokio::test]
    async fn summary_reports_requested_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/abc-7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "key": "ABC-7",
                "fields": {"summary": "Moved issue"}
            })))
            .mount(&server)
            .await;

        let result = tool(&server.uri())
            .execute(json!({"issueKey": "abc-7"}))
            .await
            .unwrap();
        assert_eq!(result.summary(), "Fetched issue abc-7: Moved issue");
        assert_eq!(result.structured.unwrap()["key"], "ABC-7");
    }

    #[tokio::test]
    async fn not_found_propagates_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/ABC-404"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"errorMessages": ["Issue does not exist"]})))
            .mount(&server)
            .await;

        let err = tool(&server.uri())
            .execute(json!({"issueKey": "ABC-404"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"), "{err}");
    }

    #[tokio::test]
    async fn empty_key_rejected() {
        let server = MockServer::start().await;
        let err = tool(&server.uri())
            .execute(json!({"issueKey": ""}))
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ToolArgError>().unwrap().to_string(),
            "issueKey: Issue key is required"
        );
        let err = tool(&server.uri()).execute(json!({})).await.unwrap_err();
        assert!(err.downcast_ref::<ToolArgError>().is_some());
    }
}
