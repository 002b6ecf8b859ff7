//! Browser automation tools
//!
//! Each tool takes typed, JSON-deserializable parameters and returns a
//! [`ToolResult`]. The [`ToolRegistry`] looks tools up by name so hosts such
//! as the MCP server can dispatch raw JSON calls.

pub mod capture;
pub mod mark;
pub mod navigate;
pub mod utils;

pub use capture::{CaptureMarkedParams, CaptureMarkedTool};
pub use mark::{MarkPageParams, MarkPageTool, UnmarkPageParams, UnmarkPageTool};
pub use navigate::{NavigateParams, NavigateTool};

use crate::browser::BrowserSession;
use crate::error::{BrowserError, Result};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Outcome of a tool call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    /// Successful result without data
    pub fn success() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    /// Successful result carrying data
    pub fn success_with(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed result with a message
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// State shared by tools during one call
pub struct ToolContext<'a> {
    pub session: &'a BrowserSession,
}

impl<'a> ToolContext<'a> {
    pub fn new(session: &'a BrowserSession) -> Self {
        Self { session }
    }
}

/// A browser tool with typed parameters
pub trait Tool: Send + Sync {
    type Params: DeserializeOwned + JsonSchema;

    /// Name the tool is registered under
    fn name(&self) -> &str;

    /// JSON schema of the parameters
    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(Self::Params)).unwrap_or_default()
    }

    fn execute_typed(&self, params: Self::Params, context: &mut ToolContext) -> Result<ToolResult>;

    /// Deserialize raw parameters and execute
    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        let params = serde_json::from_value(params)
            .map_err(|e| BrowserError::InvalidArgument(format!("Invalid parameters for '{}': {}", self.name(), e)))?;
        self.execute_typed(params, context)
    }
}

/// Object-safe view of a [`Tool`] used by the registry
pub trait DynTool: Send + Sync {
    fn tool_name(&self) -> &str;
    fn schema(&self) -> Value;
    fn call(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult>;
}

impl<T: Tool> DynTool for T {
    fn tool_name(&self) -> &str {
        self.name()
    }

    fn schema(&self) -> Value {
        self.parameters_schema()
    }

    fn call(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        self.execute(params, context)
    }
}

/// Tools by name, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Box<dyn DynTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in tool
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(NavigateTool);
        registry.register(MarkPageTool);
        registry.register(UnmarkPageTool);
        registry.register(CaptureMarkedTool);
        registry
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn DynTool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name with raw JSON parameters
    pub fn execute(&self, name: &str, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        let tool = self.get(name).ok_or_else(|| BrowserError::ToolNotFound(name.to_string()))?;
        log::debug!("Executing tool '{}'", name);
        tool.call(params, context).map_err(|e| tool_failure(name, e))
    }
}

/// Attribute a failure to the tool that raised it. Bad parameters are left
/// as they are.
fn tool_failure(tool: &str, error: BrowserError) -> BrowserError {
    match error {
        BrowserError::InvalidArgument(_) | BrowserError::ToolExecutionFailed { .. } => error,
        other => BrowserError::ToolExecutionFailed {
            tool: tool.to_string(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_defaults() {
        let registry = ToolRegistry::with_defaults();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["navigate", "mark_page", "unmark_page", "capture_marked"]);
        assert!(registry.contains("mark_page"));
        assert!(!registry.contains("click"));
    }

    #[test]
    fn test_registry_schemas_are_objects() {
        let registry = ToolRegistry::with_defaults();
        for name in registry.names() {
            let schema = registry.get(name).unwrap().schema();
            assert!(schema.is_object(), "schema for {name} should be an object");
        }
    }

    #[test]
    fn test_tool_failure_names_the_tool() {
        let err = tool_failure("mark_page", BrowserError::HostQuery("tab closed".to_string()));
        assert_eq!(err.to_string(), "Tool 'mark_page' failed: Host query failed: tab closed");

        let err = tool_failure("navigate", BrowserError::InvalidArgument("missing url".to_string()));
        assert!(matches!(err, BrowserError::InvalidArgument(_)));
    }

    #[test]
    fn test_tool_result_constructors() {
        let ok = ToolResult::success_with(serde_json::json!({"count": 2}));
        assert!(ok.success);
        assert_eq!(ok.data.unwrap()["count"], 2);

        let failed = ToolResult::failure("tab closed");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("tab closed"));

        let json = serde_json::to_value(ToolResult::success()).unwrap();
        assert_eq!(json, serde_json::json!({"success": true}));
    }
}
