//! Model Context Protocol server over stdio.

pub mod server;

pub use server::{McpServer, MAX_LINE_BYTES, PROTOCOL_VERSION};

/// Server identity of the monitoring channel.
pub const MONITOR_SERVER_NAME: &str = "agent-hq-monitor-server";
/// Server identity of the Jira channel.
pub const JIRA_SERVER_NAME: &str = "jira-mcp-server";
pub const SERVER_VERSION: &str = "0.1.0";
