use crate::browser::CaptureOptions;
use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the capture_marked tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CaptureMarkedParams {
    /// Marking attempts before giving up (default: 10)
    #[serde(default)]
    pub attempts: Option<u32>,
}

impl CaptureMarkedParams {
    fn options(&self) -> CaptureOptions {
        let options = CaptureOptions::default();
        match self.attempts {
            Some(attempts) => options.attempts(attempts),
            None => options,
        }
    }
}

/// Tool that marks the page, screenshots it and removes the marks again
#[derive(Default)]
pub struct CaptureMarkedTool;

impl Tool for CaptureMarkedTool {
    type Params = CaptureMarkedParams;

    fn name(&self) -> &str {
        "capture_marked"
    }

    fn execute_typed(&self, params: CaptureMarkedParams, context: &mut ToolContext) -> Result<ToolResult> {
        let page = context.session.capture_marked(&params.options())?;

        Ok(ToolResult::success_with(serde_json::json!({
            "count": page.descriptors.len(),
            "elements": page.descriptors,
            "screenshot": page.screenshot,
            "mime_type": "image/png"
        })))
    }
}
