//! MCP (Model Context Protocol) server implementation for page marking
//!
//! This module provides rmcp-compatible tools by wrapping the existing tool implementations.

pub mod handler;
pub use handler::BrowserServer;

use crate::tools::ToolResult as InternalToolResult;
use rmcp::{
    tool_router, tool,
    ErrorData as McpError,
    model::{CallToolResult, Content},
    handler::server::wrapper::Parameters,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Navigate tool parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NavigateParams {
    /// URL to navigate to
    pub url: String,
    /// Wait for navigation to complete (default: true)
    #[serde(default = "default_true")]
    pub wait_for_load: bool,
    /// Mark the page after loading and return its elements (default: false)
    #[serde(default)]
    pub mark: bool,
}

/// Capture parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CaptureParams {
    /// Marking attempts before giving up (default: 10)
    #[serde(default)]
    pub attempts: Option<u32>,
}

fn default_true() -> bool {
    true
}

/// Convert internal ToolResult to MCP CallToolResult
fn convert_result(result: InternalToolResult) -> Result<CallToolResult, McpError> {
    if result.success {
        let text = if let Some(data) = result.data {
            serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string())
        } else {
            "Success".to_string()
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    } else {
        let error_msg = result.error.unwrap_or_else(|| "Unknown error".to_string());
        Err(McpError::internal_error(error_msg, None))
    }
}

/// Split a capture result into image content and the remaining data as text
fn convert_capture(result: InternalToolResult) -> Result<CallToolResult, McpError> {
    if !result.success || result.data.is_none() {
        return convert_result(result);
    }
    let mut data = result.data.unwrap_or_default();

    let screenshot = data
        .as_object_mut()
        .and_then(|fields| fields.remove("screenshot"))
        .and_then(|value| value.as_str().map(str::to_string));

    let text = serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string());
    let mut contents = vec![Content::text(text)];
    if let Some(image) = screenshot {
        contents.push(Content::image(image, "image/png"));
    }

    Ok(CallToolResult::success(contents))
}

#[tool_router]
impl BrowserServer {
    /// Navigate to a URL
    #[tool(description = "Navigate to a specified URL in the browser, optionally marking the loaded page")]
    fn browser_navigate(
        &self,
        params: Parameters<NavigateParams>,
    ) -> Result<CallToolResult, McpError> {
        let tool_params = serde_json::json!({
            "url": params.0.url,
            "wait_for_load": params.0.wait_for_load,
            "mark": params.0.mark
        });

        convert_result(self.run_tool("navigate", tool_params)?)
    }

    /// Mark the interactive elements of the page
    #[tool(description = "Draw numbered boxes over every visible interactive element and list them, one entry per boxed rectangle in drawing order")]
    fn browser_mark_page(&self) -> Result<CallToolResult, McpError> {
        convert_result(self.run_tool("mark_page", serde_json::json!({}))?)
    }

    /// Remove marks from the page
    #[tool(description = "Remove the numbered boxes drawn by browser_mark_page")]
    fn browser_unmark_page(&self) -> Result<CallToolResult, McpError> {
        convert_result(self.run_tool("unmark_page", serde_json::json!({}))?)
    }

    /// Mark, screenshot and unmark the page
    #[tool(description = "Mark the page, return a screenshot showing the numbered boxes together with the element list, then remove the marks")]
    fn browser_capture_marked(
        &self,
        params: Parameters<CaptureParams>,
    ) -> Result<CallToolResult, McpError> {
        let tool_params = match params.0.attempts {
            Some(attempts) => serde_json::json!({ "attempts": attempts }),
            None => serde_json::json!({}),
        };

        convert_capture(self.run_tool("capture_marked", tool_params)?)
    }
}
