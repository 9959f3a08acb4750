pub mod args;
pub mod clear_logs;
pub mod get_metrics;
pub mod get_status;
pub mod jira_get;
pub mod jira_search;
pub mod log_activity;
pub mod log_workflow;
pub mod recent_activities;
pub mod traits;

pub use args::ToolArgError;
pub use clear_logs::ClearLogsTool;
pub use get_metrics::GetMetricsTool;
pub use get_status::GetStatusTool;
pub use jira_get::JiraGetTool;
pub use jira_search::JiraSearchTool;
pub use log_activity::LogActivityTool;
pub use log_workflow::LogWorkflowTool;
pub use recent_activities::RecentActivitiesTool;
pub use traits::{Tool, ToolResult, ToolSpec};

use crate::jira::JiraClient;
use crate::monitor::LogStore;
use std::sync::Arc;

/// The six monitoring tools, all sharing one log store.
pub fn monitor_tools(store: Arc<LogStore>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(LogActivityTool::new(store.clone())),
        Box::new(LogWorkflowTool::new(store.clone())),
        Box::new(GetStatusTool::new(store.clone())),
        Box::new(GetMetricsTool::new(store.clone())),
        Box::new(RecentActivitiesTool::new(store.clone())),
        Box::new(ClearLogsTool::new(store)),
    ]
}

pub fn jira_tools(client: Arc<JiraClient>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(JiraSearchTool::new(client.clone())),
        Box::new(JiraGetTool::new(client)),
    ]
}
