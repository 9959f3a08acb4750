//! Configuration schema.
//!
//! Non-secret options come from an optional TOML file; the Jira credentials
//! come from the environment (a `.env` file is loaded by the binary first).

use base64::Engine;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the Jira site URL.
pub const ENV_BASE_URL: &str = "JIRA_BASE_URL";
/// Environment variable holding the Jira account email.
pub const ENV_EMAIL: &str = "JIRA_EMAIL";
/// Environment variable holding the Jira API token.
pub const ENV_API_TOKEN: &str = "JIRA_API_TOKEN";

const DEFAULT_LOGS_DIR: &str = "logs";
const DEFAULT_CLOUD_API_BASE: &str = "https://api.atlassian.com";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(
        "Missing required Jira env vars: {}. Ensure they are set in .env or your shell.",
        .0.join(", ")
    )]
    MissingEnv(Vec<&'static str>),
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub monitor: MonitorConfig,
    pub jira: JiraOptions,
}

/// `[monitor]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// Directory holding the three log files. Relative paths resolve against
    /// the working directory.
    pub logs_dir: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            logs_dir: PathBuf::from(DEFAULT_LOGS_DIR),
        }
    }
}

/// `[jira]` section: routing and transport options, never credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JiraOptions {
    /// Route requests through the cloud gateway when a cloud id resolves.
    pub cloud_routing: bool,
    /// Base of the cloud gateway and of the accessible-resources directory.
    pub cloud_api_base: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for JiraOptions {
    fn default() -> Self {
        Self {
            cloud_routing: false,
            cloud_api_base: DEFAULT_CLOUD_API_BASE.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load from `path`, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

/// Resolved Jira connection settings.
#[derive(Clone)]
pub struct JiraConfig {
    /// Site URL without a trailing slash.
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub options: JiraOptions,
}

impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl JiraConfig {
    /// Read the credentials from the process environment.
    pub fn from_env(options: JiraOptions) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), options)
    }

    /// Build from any key lookup. Blank values count as missing, and every
    /// missing key is reported in one error.
    pub fn from_lookup<F>(lookup: F, options: JiraOptions) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = read(ENV_BASE_URL)
            .map(|url| url.strip_suffix('/').unwrap_or(&url).to_string())
            .filter(|url| !url.is_empty());
        let email = read(ENV_EMAIL);
        let api_token = read(ENV_API_TOKEN);

        match (base_url, email, api_token) {
            (Some(base_url), Some(email), Some(api_token)) => Ok(Self {
                base_url,
                email,
                api_token,
                options,
            }),
            (base_url, email, api_token) => {
                let mut missing = Vec::new();
                if base_url.is_none() {
                    missing.push(ENV_BASE_URL);
                }
                if email.is_none() {
                    missing.push(ENV_EMAIL);
                }
                if api_token.is_none() {
                    missing.push(ENV_API_TOKEN);
                }
                Err(ConfigError::MissingEnv(missing))
            }
        }
    }

    /// `Basic base64(email:token)`
    pub fn auth_header(&self) -> String {
        let raw = format!("{}:{}", self.email, self.api_token);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }
}
