pub mod schema;

pub use schema::{Config, ConfigError, JiraConfig, JiraOptions, MonitorConfig};
