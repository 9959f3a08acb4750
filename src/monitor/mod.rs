//! Activity monitor: append-only logs of agent and workflow events, and the
//! metrics derived from them.

pub mod metrics;
pub mod records;
pub mod store;

pub use metrics::{
    compute_agent_metrics, compute_status, compute_workflow_status, AgentMetrics,
    AgentMetricsMap, Health, StatusSnapshot, WorkflowSummary,
};
pub use records::{ActivityRecord, ActivityStatus, Context, WorkflowRecord, WorkflowStatus};
pub use store::{LogCategory, LogStore, ReadOutcome, StoreError};
