use crate::config::JiraConfig;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

const API_PREFIX: &str = "rest/api/3";

#[derive(Debug, thiserror::Error)]
pub enum JiraError {
    #[error("Jira request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Cloud Jira request failed {status}: {body}")]
    CloudStatus { status: u16, body: String },
    #[error("Jira request error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl JiraError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::CloudStatus { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Parameters of a JQL search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub jql: String,
    pub fields: Vec<String>,
    pub expand: Vec<String>,
    pub max_results: Option<u32>,
    pub start_at: Option<u64>,
}

impl SearchQuery {
    pub fn new(jql: impl Into<String>) -> Self {
        Self {
            jql: jql.into(),
            ..Self::default()
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("jql", self.jql.clone())];
        params.extend(list_params(&self.fields, &self.expand));
        if let Some(max) = self.max_results {
            params.push(("maxResults", max.to_string()));
        }
        if let Some(start) = self.start_at {
            params.push(("startAt", start.to_string()));
        }
        params
    }
}

/// `fields` and `expand` as comma-joined values; empty lists are omitted.
fn list_params(fields: &[String], expand: &[String]) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if !fields.is_empty() {
        params.push(("fields", fields.join(",")));
    }
    if !expand.is_empty() {
        params.push(("expand", expand.join(",")));
    }
    params
}

/// Entry of the cloud accessible-resources directory.
#[derive(Debug, Deserialize)]
struct AccessibleResource {
    id: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Site,
    Cloud,
}

/// Read-only Jira REST client.
///
/// The cloud id, once resolved, is kept for the client's lifetime. A failed
/// resolution is not remembered, so the next request tries again.
pub struct JiraClient {
    config: JiraConfig,
    auth_header: String,
    http: Client,
    cloud_id: OnceCell<String>,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self, JiraError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.options.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            auth_header: config.auth_header(),
            config,
            http: builder.build()?,
            cloud_id: OnceCell::new(),
        })
    }

    /// `GET /rest/api/3/search`
    pub async fn search(&self, query: &SearchQuery) -> Result<Value, JiraError> {
        self.get(&format!("{API_PREFIX}/search"), &query.params())
            .await
    }

    /// `GET /rest/api/3/issue/{key}`
    pub async fn get_issue(
        &self,
        issue_key: &str,
        fields: &[String],
        expand: &[String],
    ) -> Result<Value, JiraError> {
        let path = format!("{API_PREFIX}/issue/{}", urlencoding::encode(issue_key));
        self.get(&path, &list_params(fields, expand)).await
    }

    /// The cloud id for the configured site, or `None` when it cannot be
    /// determined.
    pub async fn cloud_id(&self) -> Option<String> {
        match self.cloud_id.get_or_try_init(|| self.fetch_cloud_id()).await {
            Ok(id) => Some(id.clone()),
            Err(e) => {
                debug!(error = %e, "Cloud id unavailable, using site endpoint");
                None
            }
        }
    }

    async fn fetch_cloud_id(&self) -> anyhow::Result<String> {
        let url = format!(
            "{}/oauth/token/accessible-resources",
            self.config.options.cloud_api_base.trim_end_matches('/')
        );
        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, &self.auth_header)
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("accessible-resources returned {}", response.status());
        }
        let resources: Vec<AccessibleResource> = response.json().await?;

        let site = authority(&self.config.base_url);
        let matched = resources
            .iter()
            .find(|r| site.is_some() && r.url.as_deref().and_then(authority) == site)
            .or_else(|| resources.first());

        let id = matched
            .and_then(|r| r.id.clone())
            .ok_or_else(|| anyhow::anyhow!("no accessible Jira site listed"))?;
        debug!(cloud_id = %id, "Resolved Jira cloud id");
        Ok(id)
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, JiraError> {
        if self.config.options.cloud_routing {
            if let Some(cloud_id) = self.cloud_id().await {
                let base = format!(
                    "{}/ex/jira/{cloud_id}",
                    self.config.options.cloud_api_base.trim_end_matches('/')
                );
                return self.send(Route::Cloud, &base, path, params).await;
            }
        }
        self.send(Route::Site, &self.config.base_url, path, params)
            .await
    }

    async fn send(
        &self,
        route: Route,
        base: &str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Value, JiraError> {
        let url = format!("{base}/{}", path.trim_start_matches('/'));
        debug!(url = %url, ?route, "Jira request");

        let mut request = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, &self.auth_header);
        if !params.is_empty() {
            request = request.query(params);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response.text().await.unwrap_or_default());
            let status = status.as_u16();
            return Err(match route {
                Route::Site => JiraError::Status { status, body },
                Route::Cloud => JiraError::CloudStatus { status, body },
            });
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        Ok(response.json().await?)
    }
}

/// Compact JSON when the body parses as JSON, otherwise the raw text.
fn error_body(raw: String) -> String {
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::String(s)) => s,
        Ok(value) => value.to_string(),
        Err(_) => raw,
    }
}

/// Host and explicit port of `url`, for matching a site against the cloud
/// directory.
fn authority(url: &str) -> Option<(String, Option<u16>)> {
    let parsed = Url::parse(url).ok()?;
    Some((parsed.host_str()?.to_ascii_lowercase(), parsed.port()))
}
