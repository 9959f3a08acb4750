//! Record types written to the activity logs, and the length bounds applied
//! to them before they are persisted.

use crate::util::truncate_chars;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum characters kept for identifiers (agent, workflow id and type).
pub const MAX_ID_CHARS: usize = 100;
/// Maximum characters kept for an activity's action text.
pub const MAX_ACTION_CHARS: usize = 200;
/// Maximum characters of the serialized `context` object.
pub const MAX_CONTEXT_CHARS: usize = 1000;
/// Maximum participants kept on a workflow record.
pub const MAX_WORKFLOW_AGENTS: usize = 20;

/// Free-form caller metadata attached to a record.
pub type Context = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityStatus {
    Started,
    Completed,
    Failed,
}

impl ActivityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowStatus {
    Started,
    InProgress,
    Completed,
    Failed,
}

impl WorkflowStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// `started` and `in-progress` both count as running.
    pub fn is_running(self) -> bool {
        matches!(self, Self::Started | Self::InProgress)
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One agent invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    /// Assigned by the store at append time; empty until then.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timestamp: String,
    pub agent: String,
    pub action: String,
    pub status: ActivityStatus,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
}

impl ActivityRecord {
    /// Build a record with every field cut to its bound.
    pub fn new(
        agent: &str,
        action: &str,
        status: ActivityStatus,
        duration: Option<f64>,
        context: Option<Context>,
    ) -> Self {
        Self {
            timestamp: String::new(),
            agent: truncate_chars(agent, MAX_ID_CHARS),
            action: truncate_chars(action, MAX_ACTION_CHARS),
            status,
            duration,
            context: context.map(|ctx| bound_context(ctx, MAX_CONTEXT_CHARS)),
        }
    }
}

/// One workflow lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRecord {
    pub workflow_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timestamp: String,
    pub workflow_type: String,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub agents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
}

impl WorkflowRecord {
    /// Build a record with every field cut to its bound.
    pub fn new(
        workflow_id: &str,
        workflow_type: &str,
        status: WorkflowStatus,
        agents: &[String],
        duration: Option<f64>,
        context: Option<Context>,
    ) -> Self {
        Self {
            workflow_id: truncate_chars(workflow_id, MAX_ID_CHARS),
            timestamp: String::new(),
            workflow_type: truncate_chars(workflow_type, MAX_ID_CHARS),
            status,
            agents: agents
                .iter()
                .take(MAX_WORKFLOW_AGENTS)
                .map(|a| truncate_chars(a, MAX_ID_CHARS))
                .collect(),
            duration,
            context: context.map(|ctx| bound_context(ctx, MAX_CONTEXT_CHARS)),
        }
    }
}

/// Keep top-level entries, in key order, while the serialized object stays
/// within `max_chars`. An entry that would overflow is dropped whole, so the
/// result is always a well-formed object.
pub fn bound_context(context: Context, max_chars: usize) -> Context {
    // "{}" plus one comma between each pair of entries
    let mut used = 2usize;
    let mut kept = Context::new();

    for (key, value) in context {
        let entry_chars = serialized_chars(&Value::String(key.clone()))
            + 1
            + serialized_chars(&value);
        let separator = usize::from(!kept.is_empty());
        if used + separator + entry_chars > max_chars {
            continue;
        }
        used += separator + entry_chars;
        kept.insert(key, value);
    }

    kept
}

/// Length of the compact JSON form, in characters.
pub fn serialized_chars(value: &Value) -> usize {
    value.to_string().chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(value: Value) -> Context {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(json!(ActivityStatus::Completed), json!("completed"));
        assert_eq!(json!(WorkflowStatus::InProgress), json!("in-progress"));
        let parsed: WorkflowStatus = serde_json::from_value(json!("in-progress")).unwrap();
        assert_eq!(parsed, WorkflowStatus::InProgress);
        assert!(serde_json::from_value::<ActivityStatus>(json!("in-progress")).is_err());
    }

    #[test]
    fn running_statuses() {
        assert!(WorkflowStatus::Started.is_running());
        assert!(WorkflowStatus::InProgress.is_running());
        assert!(!WorkflowStatus::Completed.is_running());
        assert!(!WorkflowStatus::Failed.is_running());
    }

    #[test]
    fn activity_fields_truncated() {
        let agent = "a".repeat(150);
        let action = "b".repeat(250);
        let record = ActivityRecord::new(&agent, &action, ActivityStatus::Started, None, None);
        assert_eq!(record.agent, "a".repeat(100));
        assert_eq!(record.action.chars().count(), 200);
        assert!(record.timestamp.is_empty());
    }

    #[test]
    fn activity_serializes_camel_case_without_empty_fields() {
        let record = ActivityRecord::new("planner", "plan", ActivityStatus::Completed, None, None);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({"agent": "planner", "action": "plan", "status": "completed"})
        );
    }

    #[test]
    fn workflow_agents_capped() {
        let agents: Vec<String> = (0..25).map(|i| format!("agent-{i}")).collect();
        let mut long = agents.clone();
        long[0] = "x".repeat(120);
        let record = WorkflowRecord::new(
            "wf-1",
            "release",
            WorkflowStatus::Started,
            &long,
            Some(3.5),
            None,
        );
        assert_eq!(record.agents.len(), 20);
        assert_eq!(record.agents[0].len(), 100);
        assert_eq!(record.agents[19], "agent-19");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["workflowId"], "wf-1");
        assert_eq!(value["workflowType"], "release");
        assert_eq!(value["status"], "started");
    }

    #[test]
    fn workflow_reads_without_agents() {
        let record: WorkflowRecord = serde_json::from_value(json!({
            "workflowId": "wf",
            "timestamp": "2026-01-01T00:00:00.000Z",
            "workflowType": "t",
            "status": "failed"
        }))
        .unwrap();
        assert!(record.agents.is_empty());
    }

    #[test]
    fn small_context_kept_verbatim() {
        let context = ctx(json!({"ticket": "ABC-1", "attempt": 2}));
        let bounded = bound_context(context.clone(), MAX_CONTEXT_CHARS);
        assert_eq!(bounded, context);
    }

    #[test]
    fn oversized_entry_dropped_whole() {
        let context = ctx(json!({
            "a": "short",
            "b": "x".repeat(2000),
            "c": 1
        }));
        let bounded = bound_context(context, MAX_CONTEXT_CHARS);
        assert_eq!(Value::Object(bounded.clone()), json!({"a": "short", "c": 1}));
        assert!(serialized_chars(&Value::Object(bounded)) <= MAX_CONTEXT_CHARS);
    }

    #[test]
    fn bounded_context_never_exceeds_limit() {
        let mut context = Context::new();
        for i in 0..200 {
            context.insert(format!("key{i:03}"), json!("0123456789"));
        }
        let bounded = bound_context(context, MAX_CONTEXT_CHARS);
        let size = serialized_chars(&Value::Object(bounded.clone()));
        assert!(size <= MAX_CONTEXT_CHARS, "size {size}");
        // every entry is the same width, so the kept set is a prefix
        assert!(bounded.contains_key("key000"));
        assert!(!bounded.contains_key("key199"));
    }

    #[test]
    fn exact_fit_is_kept() {
        // {"k":"..."} = 2 braces + 3 key + 1 colon + value
        let value_len = MAX_CONTEXT_CHARS - 6 - 2;
        let context = ctx(json!({"k": "v".repeat(value_len)}));
        let bounded = bound_context(context, MAX_CONTEXT_CHARS);
        assert_eq!(
            serialized_chars(&Value::Object(bounded.clone())),
            MAX_CONTEXT_CHARS
        );
        assert!(bounded.contains_key("k"));
    }

    #[test]
    fn context_bounded_on_record() {
        let context = ctx(json!({"blob": "y".repeat(1500)}));
        let record = ActivityRecord::new("a", "b", ActivityStatus::Failed, None, Some(context));
        assert_eq!(record.context, Some(Context::new()));
    }
}
