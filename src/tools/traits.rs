//! Tool trait: one implementation per operation served over MCP.
//!
//! Every monitor and Jira operation is a `Tool`. The MCP server lists them via
//! [`Tool::spec`] and dispatches `tools/call` requests to [`Tool::execute`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of a tool execution.
///
/// Carries one or more human-readable text blocks and, for read operations,
/// the structured payload the text was rendered from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool executed successfully
    pub success: bool,
    /// Text blocks, summary first
    pub content: Vec<String>,
    /// Machine-readable copy of the result, if any
    pub structured: Option<Value>,
    /// Error message if the tool failed (None if successful)
    pub error: Option<String>,
}

impl ToolResult {
    /// A single text block, no structured payload.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            success: true,
            content: vec![text.into()],
            structured: None,
            error: None,
        }
    }

    /// A summary block, the pretty-printed payload, and the payload itself.
    pub fn with_structured(summary: impl Into<String>, structured: Value) -> Self {
        let pretty = serde_json::to_string_pretty(&structured).unwrap_or_else(|_| structured.to_string());
        Self {
            success: true,
            content: vec![summary.into(), pretty],
            structured: Some(structured),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: Vec::new(),
            structured: None,
            error: Some(message.into()),
        }
    }

    /// First text block, or the error for failed results.
    pub fn summary(&self) -> &str {
        self.content
            .first()
            .map(String::as_str)
            .or(self.error.as_deref())
            .unwrap_or("")
    }
}

/// Description of a tool for `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name (used in `tools/call`)
    pub name: String,
    /// Short display title
    pub title: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// JSON Schema describing the tool's parameters
    pub parameters: Value,
}

/// Core tool trait.
///
/// # Implementation Guide
///
/// 1. Implement `name()` with the dotted wire name (e.g. `agentHQ.getStatus`)
/// 2. Implement `title()` and `description()` for clients listing tools
/// 3. Implement `parameters_schema()` with a JSON Schema for parameters
/// 4. Implement `execute()`; reject bad input with a [`super::args::ToolArgError`]
///    before any side effect
/// 5. Register the tool in `src/tools/mod.rs`
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name used in `tools/call`.
    fn name(&self) -> &str;

    /// Short display title.
    fn title(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's parameters.
    ///
    /// ```json
    /// {
    ///   "type": "object",
    ///   "properties": {
    ///     "agent": { "type": "string", "minLength": 1 }
    ///   },
    ///   "required": ["agent"]
    /// }
    /// ```
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given arguments.
    ///
    /// # Errors
    ///
    /// Invalid arguments surface as a `ToolArgError` (downcastable from the
    /// returned `anyhow::Error`); storage and upstream failures as any other
    /// error.
    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult>;

    /// Get the full spec for `tools/list`.
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            title: self.title().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}
