//! Derived views over the logs. Nothing here is cached; every call rescans.
//!
//! Agent metrics always scan the whole invocation log, while the workflow
//! summary only looks at the last [`WORKFLOW_SCAN_LIMIT`] workflow records.

use super::records::{ActivityRecord, ActivityStatus, WorkflowRecord, WorkflowStatus};
use super::store::{timestamp_now, LogCategory, LogStore, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Workflow records considered by [`compute_workflow_status`].
pub const WORKFLOW_SCAN_LIMIT: usize = 50;
/// Workflow records echoed back, most recent first.
pub const RECENT_WORKFLOWS: usize = 10;

/// Per-agent counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetrics {
    pub total_invocations: u64,
    pub successful: u64,
    pub failed: u64,
    /// Sum of recorded durations; records without one add nothing.
    pub total_duration: f64,
    /// `"{:.1}s"`, or `"0s"` with no invocations.
    pub avg_duration: String,
    /// `"{:.1}%"`, or `"0%"` with no invocations.
    pub success_rate: String,
}

impl AgentMetrics {
    fn empty() -> Self {
        Self {
            total_invocations: 0,
            successful: 0,
            failed: 0,
            total_duration: 0.0,
            avg_duration: format_avg_duration(0.0, 0),
            success_rate: format_success_rate(0, 0),
        }
    }

    fn record(&mut self, activity: &ActivityRecord) {
        self.total_invocations += 1;
        match activity.status {
            ActivityStatus::Completed => self.successful += 1,
            ActivityStatus::Failed => self.failed += 1,
            ActivityStatus::Started => {}
        }
        self.total_duration += activity.duration.unwrap_or(0.0);
    }

    fn finish(&mut self) {
        self.success_rate = format_success_rate(self.successful, self.total_invocations);
        self.avg_duration = format_avg_duration(self.total_duration, self.total_invocations);
    }
}

/// Metrics keyed by agent name. Only agents with at least one record appear.
pub type AgentMetricsMap = BTreeMap<String, AgentMetrics>;

#[allow(clippy::cast_precision_loss)]
pub fn format_success_rate(successful: u64, total: u64) -> String {
    if total == 0 {
        return "0%".into();
    }
    format!("{}%", one_decimal(successful as f64 / total as f64 * 100.0))
}

#[allow(clippy::cast_precision_loss)]
pub fn format_avg_duration(total_duration: f64, total: u64) -> String {
    if total == 0 {
        return "0s".into();
    }
    format!("{}s", one_decimal(total_duration / total as f64))
}

/// `value` with one decimal place, an exact half rounded away from zero.
///
/// `{:.1}` rounds an exact half to even (6.25 becomes "6.2"). Scaling by ten
/// in floating point is not exact either, so the tie is decided on the
/// binary mantissa: `value = mantissa * 2^-k`, hence
/// `value * 10 = (10 * mantissa) / 2^k` with an exact remainder.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn one_decimal(value: f64) -> String {
    if !value.is_finite() {
        return format!("{value:.1}");
    }
    let bits = value.abs().to_bits();
    let biased_exponent = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if biased_exponent == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased_exponent - 1075)
    };
    if exponent >= 0 {
        // an integer, nothing to round
        return format!("{value:.1}");
    }

    let shift = exponent.unsigned_abs();
    let scaled = u128::from(mantissa) * 10;
    let tenths = if shift >= 128 {
        // below 2^-75, rounds to zero
        0
    } else {
        let shift = shift as u32;
        let whole = scaled >> shift;
        let remainder = scaled & ((1u128 << shift) - 1);
        if remainder << 1 >= 1u128 << shift {
            whole + 1
        } else {
            whole
        }
    };

    let sign = if value.is_sign_negative() && tenths != 0 { "-" } else { "" };
    format!("{sign}{}.{}", tenths / 10, tenths % 10)
}

pub fn summarize_agents(activities: &[ActivityRecord]) -> AgentMetricsMap {
    let mut metrics = AgentMetricsMap::new();
    for activity in activities {
        metrics
            .entry(activity.agent.clone())
            .or_insert_with(AgentMetrics::empty)
            .record(activity);
    }
    for entry in metrics.values_mut() {
        entry.finish();
    }
    metrics
}

/// Counts over a bounded window of workflow events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    /// Records in the scanned window, not in the whole log.
    pub total: usize,
    /// `started` or `in-progress`.
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
    /// Newest first.
    pub recent_workflows: Vec<WorkflowRecord>,
}

pub fn summarize_workflows(workflows: &[WorkflowRecord]) -> WorkflowSummary {
    let count = |pred: fn(WorkflowStatus) -> bool| {
        workflows.iter().filter(|w| pred(w.status)).count()
    };

    WorkflowSummary {
        total: workflows.len(),
        in_progress: count(WorkflowStatus::is_running),
        completed: count(|s| s == WorkflowStatus::Completed),
        failed: count(|s| s == WorkflowStatus::Failed),
        recent_workflows: workflows
            .iter()
            .rev()
            .take(RECENT_WORKFLOWS)
            .cloned()
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    /// At least one workflow in the window is running.
    Active,
    Idle,
}

impl std::fmt::Display for Health {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Idle => f.write_str("idle"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub timestamp: String,
    pub agents: AgentMetricsMap,
    pub workflows: WorkflowSummary,
    pub health: Health,
}

impl StatusSnapshot {
    pub fn new(agents: AgentMetricsMap, workflows: WorkflowSummary) -> Self {
        let health = if workflows.in_progress > 0 {
            Health::Active
        } else {
            Health::Idle
        };
        Self {
            timestamp: timestamp_now(),
            agents,
            workflows,
            health,
        }
    }

    /// The line written to the status log for every status query.
    pub fn audit_record(&self) -> Result<Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(fields) = &mut value {
            fields.insert("type".into(), Value::String("status_check".into()));
        }
        Ok(value)
    }
}

pub fn compute_agent_metrics(store: &LogStore) -> Result<AgentMetricsMap, StoreError> {
    let activities = store.read_all::<ActivityRecord>(LogCategory::Invocations, None)?;
    Ok(summarize_agents(&activities.records))
}

pub fn compute_workflow_status(store: &LogStore) -> Result<WorkflowSummary, StoreError> {
    let workflows =
        store.read_all::<WorkflowRecord>(LogCategory::Workflows, Some(WORKFLOW_SCAN_LIMIT))?;
    Ok(summarize_workflows(&workflows.records))
}

/// Both aggregates, without touching the status log.
pub fn compute_status(store: &LogStore) -> Result<StatusSnapshot, StoreError> {
    Ok(StatusSnapshot::new(
        compute_agent_metrics(store)?,
        compute_workflow_status(store)?,
    ))
}
